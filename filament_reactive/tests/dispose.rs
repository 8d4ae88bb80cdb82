use filament_reactive::{create_effect, create_runtime, create_signal, Effect};

#[test]
fn disposed_effect_stops_rerunning() {
    use std::{cell::RefCell, rc::Rc};

    let runtime = create_runtime();

    let a = create_signal(runtime, -1);

    // simulate an arbitrary side effect
    let b = Rc::new(RefCell::new(String::new()));

    let effect = create_effect(runtime, {
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

    effect.dispose();
    a.set(2).unwrap();

    assert_eq!(b.borrow().as_str(), "Value is 1");

    // a repeat dispose is a no-op
    effect.dispose();
    a.set(3).unwrap();

    assert_eq!(b.borrow().as_str(), "Value is 1");

    runtime.dispose();
}

#[test]
fn dispose_unsubscribes_every_source() {
    use std::{cell::Cell, rc::Rc};

    let runtime = create_runtime();

    let a = create_signal(runtime, 0);
    let b = create_signal(runtime, 0);

    // simulate an arbitrary side effect
    let runs = Rc::new(Cell::new(0));

    let effect = create_effect(runtime, {
        let runs = runs.clone();
        move || {
            runs.set(runs.get() + 1);
            a.get();
            b.get();
            Ok(())
        }
    })
    .unwrap();

    assert_eq!(runs.get(), 1);

    effect.dispose();
    a.set(1).unwrap();
    b.set(1).unwrap();

    assert_eq!(runs.get(), 1);

    runtime.dispose();
}

#[test]
fn effect_can_dispose_itself_mid_run() {
    use std::{cell::RefCell, rc::Rc};

    let runtime = create_runtime();

    let a = create_signal(runtime, 0);

    // simulate an arbitrary side effect
    let log = Rc::new(RefCell::new(Vec::new()));
    let handle: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));

    let effect = create_effect(runtime, {
        let log = log.clone();
        let handle = handle.clone();
        move || {
            log.borrow_mut().push("start");
            if a.get() >= 1 {
                if let Some(effect) = *handle.borrow() {
                    effect.dispose();
                }
            }
            log.borrow_mut().push("end");
            Ok(())
        }
    })
    .unwrap();
    *handle.borrow_mut() = Some(effect);

    assert_eq!(*log.borrow(), ["start", "end"]);

    // the body completes before the deferred teardown happens
    a.set(1).unwrap();

    assert_eq!(*log.borrow(), ["start", "end", "start", "end"]);

    a.set(2).unwrap();

    assert_eq!(log.borrow().len(), 4);

    effect.dispose();

    runtime.dispose();
}

#[test]
fn effect_disposed_mid_broadcast_is_skipped() {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    let runtime = create_runtime();

    let a = create_signal(runtime, 0);

    // simulate an arbitrary side effect
    let a_runs = Rc::new(Cell::new(0));
    let b_runs = Rc::new(Cell::new(0));
    let b_handle: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));

    // registered first, so it runs first and tears the second down
    create_effect(runtime, {
        let a_runs = a_runs.clone();
        let b_handle = b_handle.clone();
        move || {
            a_runs.set(a_runs.get() + 1);
            a.get();
            if let Some(b) = b_handle.borrow_mut().take() {
                b.dispose();
            }
            Ok(())
        }
    })
    .unwrap();
    let b = create_effect(runtime, {
        let b_runs = b_runs.clone();
        move || {
            b_runs.set(b_runs.get() + 1);
            a.get();
            Ok(())
        }
    })
    .unwrap();
    *b_handle.borrow_mut() = Some(b);

    assert_eq!(a_runs.get(), 1);
    assert_eq!(b_runs.get(), 1);

    a.set(1).unwrap();

    assert_eq!(a_runs.get(), 2);
    assert_eq!(b_runs.get(), 1);

    a.set(2).unwrap();

    assert_eq!(a_runs.get(), 3);
    assert_eq!(b_runs.get(), 1);

    runtime.dispose();
}

#[test]
fn dispose_after_runtime_dispose_is_silent() {
    let runtime = create_runtime();

    let a = create_signal(runtime, 0);

    let effect = create_effect(runtime, move || {
        a.get();
        Ok(())
    })
    .unwrap();

    runtime.dispose();

    effect.dispose();
}

#[test]
#[should_panic(expected = "runtime that has been disposed")]
fn read_after_runtime_dispose_panics() {
    let runtime = create_runtime();

    let a = create_signal(runtime, 0);

    runtime.dispose();

    let _ = a.get();
}

#[test]
#[should_panic(expected = "runtime that has been disposed")]
fn write_after_runtime_dispose_panics() {
    let runtime = create_runtime();

    let a = create_signal(runtime, 0);

    runtime.dispose();

    let _ = a.set(1);
}
