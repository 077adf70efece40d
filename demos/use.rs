use avl_list::{AvlTreeList, ClearPolicy};

#[derive(Debug)]
struct Timer {
    deadline: u64,
    name: &'static str,
}

fn main() {
    let mut timers = AvlTreeList::with_comparator(|a: &Timer, b: &Timer| a.deadline.cmp(&b.deadline))
        .with_clear_policy(ClearPolicy::Reset);

    let flush = timers.add(Timer { deadline: 30, name: "flush" });
    timers.add(Timer { deadline: 10, name: "tick" });
    let retry = timers.add(Timer { deadline: 20, name: "retry" });
    timers.add(Timer { deadline: 50, name: "gc" });

    // Postpone the retry past the flush.
    timers.update(retry, |timer| timer.deadline = 40).unwrap();

    timers.for_each(|timer| println!("{:>3} {}", timer.deadline, timer.name));

    let probe = Timer { deadline: 35, name: "" };
    println!("next after 35: {:?}", timers.get_smallest_above(&probe));
    println!("last before 35: {:?}", timers.get_greatest_below(&probe));

    assert_eq!(timers.remove(flush).map(|timer| timer.name), Ok("flush"));
    while let Some(timer) = timers.pop_smallest() {
        println!("fired {} at {}", timer.name, timer.deadline);
    }

    timers.clear();
    assert!(timers.remove(retry).is_err());
}
