use filament_reactive::{create_effect, create_runtime, create_signal};

#[test]
fn untracked_set_doesnt_trigger_effect() {
    use std::{cell::RefCell, rc::Rc};

    let runtime = create_runtime();

    let a = create_signal(runtime, -1);

    // simulate an arbitrary side effect
    let b = Rc::new(RefCell::new(String::new()));

    create_effect(runtime, {
        let b = b.clone();
        move || {
            let formatted = format!("Value is {}", a.get());
            *b.borrow_mut() = formatted;
            Ok(())
        }
    })
    .unwrap();

    assert_eq!(b.borrow().as_str(), "Value is -1");

    a.set(1).unwrap();

    assert_eq!(b.borrow().as_str(), "Value is 1");

    a.set_untracked(-1);

    assert_eq!(b.borrow().as_str(), "Value is 1");
    assert_eq!(a.get_untracked(), -1);

    runtime.dispose();
}

#[test]
fn untracked_get_doesnt_trigger_effect() {
    use std::{cell::RefCell, rc::Rc};

    let runtime = create_runtime();

    let a = create_signal(runtime, -1);
    let a2 = create_signal(runtime, 1);

    // simulate an arbitrary side effect
    let b = Rc::new(RefCell::new(String::new()));

    create_effect(runtime, {
        let b = b.clone();
        move || {
            let formatted =
                format!("Values are {} and {}", a.get(), a2.get_untracked());
            *b.borrow_mut() = formatted;
            Ok(())
        }
    })
    .unwrap();

    assert_eq!(b.borrow().as_str(), "Values are -1 and 1");

    a.set(1).unwrap();

    assert_eq!(b.borrow().as_str(), "Values are 1 and 1");

    a2.set(-1).unwrap();

    assert_eq!(b.borrow().as_str(), "Values are 1 and 1");

    a.set(-1).unwrap();

    assert_eq!(b.borrow().as_str(), "Values are -1 and -1");

    runtime.dispose();
}

#[test]
fn untrack_zone_mutes_reads() {
    use std::{cell::Cell, rc::Rc};

    let runtime = create_runtime();

    let tracked = create_signal(runtime, 1);
    let ignored = create_signal(runtime, 10);

    // simulate an arbitrary side effect
    let sum = Rc::new(Cell::new(0));

    create_effect(runtime, {
        let sum = sum.clone();
        move || {
            sum.set(tracked.get() + runtime.untrack(|| ignored.get()));
            Ok(())
        }
    })
    .unwrap();

    assert_eq!(sum.get(), 11);

    ignored.set(20).unwrap();

    assert_eq!(sum.get(), 11);

    tracked.set(2).unwrap();

    assert_eq!(sum.get(), 22);

    runtime.dispose();
}

#[test]
fn with_untracked_doesnt_subscribe() {
    use std::{cell::RefCell, rc::Rc};

    let runtime = create_runtime();

    let a = create_signal(runtime, vec![1, 2, 3]);

    // simulate an arbitrary side effect
    let lens = Rc::new(RefCell::new(Vec::new()));

    create_effect(runtime, {
        let lens = lens.clone();
        move || {
            lens.borrow_mut().push(a.with_untracked(|v| v.len()));
            Ok(())
        }
    })
    .unwrap();

    assert_eq!(*lens.borrow(), [3]);

    a.set(vec![1]).unwrap();

    assert_eq!(*lens.borrow(), [3]);
    assert_eq!(a.with_untracked(|v| v.len()), 1);

    runtime.dispose();
}
