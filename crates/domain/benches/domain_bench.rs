use std::sync::Arc;

use chrono::{Days, Utc};
use common::{OrderStatus, ServiceId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    CreateOrder, InMemoryDispatcher, OrderCodeGenerator, OrderLifecycle, OrderService, parse_code,
};
use order_store::{Customer, InMemoryOrderRepository};

fn create_cmd() -> CreateOrder {
    CreateOrder::new(
        ServiceId::new(1),
        Customer::new("Bench", "bench@x.test", "0812"),
        "Benchmark order",
        Utc::now().date_naive().checked_add_days(Days::new(7)).unwrap(),
    )
}

fn create_service() -> OrderService<InMemoryOrderRepository> {
    OrderService::new(InMemoryOrderRepository::new())
        .with_notifier(Arc::new(InMemoryDispatcher::new()))
}

fn bench_code_candidate(c: &mut Criterion) {
    let generator = OrderCodeGenerator::new("ACME");
    let today = Utc::now().date_naive();

    c.bench_function("domain/code_candidate", |b| {
        b.iter(|| generator.candidate(today));
    });
}

fn bench_parse_code(c: &mut Criterion) {
    c.bench_function("domain/parse_code", |b| {
        b.iter(|| parse_code("ORD-ACME-20261018-K7Q2Z").unwrap());
    });
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = create_service();

    // Pre-populate so code checks hit a non-trivial index.
    rt.block_on(async {
        for _ in 0..1_000 {
            service.create_order(create_cmd()).await.unwrap();
        }
    });

    c.bench_function("domain/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.create_order(create_cmd()).await.unwrap();
            });
        });
    });
}

fn bench_full_lifecycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/create_and_complete", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = create_service();
                let created = service.create_order(create_cmd()).await.unwrap();

                let mut current = OrderStatus::Pending;
                while let Some(&next) = OrderLifecycle::next_options(current).first() {
                    service
                        .update_status(created.order.id, next)
                        .await
                        .unwrap();
                    current = next;
                }
            });
        });
    });
}

criterion_group!(
    benches,
    bench_code_candidate,
    bench_parse_code,
    bench_create_order,
    bench_full_lifecycle,
);
criterion_main!(benches);
