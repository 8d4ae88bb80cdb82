use criterion::{criterion_group, criterion_main, Criterion};
use std::{cell::Cell, rc::Rc};

fn filament_fan_out(c: &mut Criterion) {
    use filament_reactive::*;

    c.bench_function("filament_fan_out", |b| {
        b.iter(|| {
            let runtime = create_runtime();
            let source = create_signal(runtime, 0);
            let acc = Rc::new(Cell::new(0));
            for _ in 0..1000 {
                let acc = Rc::clone(&acc);
                create_effect(runtime, move || {
                    acc.set(acc.get() + source.get());
                    Ok(())
                })
                .unwrap();
            }
            assert_eq!(acc.get(), 0);
            source.set(1).unwrap();
            assert_eq!(acc.get(), 1000);
            runtime.dispose();
        });
    });
}

criterion_group!(fan_out, filament_fan_out);
criterion_main!(fan_out);
