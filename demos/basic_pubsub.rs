//! # Example: basic_pubsub
//!
//! Typed publish/subscribe with a small message hierarchy.
//!
//! Demonstrates how to:
//! - Declare messages and subtypes with `message!`.
//! - Subscribe closures and a `Handler` object, exact or polymorphic.
//! - Await delivery with `send_async` and read its `bool` result.
//!
//! ## Flow
//! ```text
//! send_async(Order)          → audit, metrics
//! send_async(PriorityOrder)  → audit (as Order), metrics, escalation
//! send_async(Order{qty: 0})  → audit fails inline → result = false
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=serialbus=debug cargo run --example basic_pubsub
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use serialbus::{
    message, Bus, BusConfig, Envelope, Handler, HandlerError, HandlerRef, SubscribeOptions,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct Order {
    sku: String,
    qty: u32,
}

struct PriorityOrder {
    order: Order,
    deadline_hours: u32,
}

message!(Order);
message!(PriorityOrder: Order => order);

/// Counts every order by its concrete type.
struct Metrics {
    plain: AtomicU64,
    priority: AtomicU64,
}

#[async_trait::async_trait]
impl Handler<Order> for Metrics {
    fn name(&self) -> &str {
        "metrics"
    }

    async fn handle(&self, msg: Envelope<Order>, _ctx: CancellationToken) -> Result<(), HandlerError> {
        if msg.is_exact() {
            self.plain.fetch_add(1, Ordering::Relaxed);
        } else {
            self.priority.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus = Bus::new(BusConfig::default().with_name("orders"));

    // Every order, including priority ones viewed as plain orders.
    bus.subscribe(
        |order: Envelope<Order>, _ctx: CancellationToken| async move {
            if order.qty == 0 {
                return Err(HandlerError::fail(format!("empty order for {}", order.sku)));
            }
            println!("[audit] {} x{} ({})", order.sku, order.qty, order.message_type());
            Ok(())
        },
        SubscribeOptions::new(),
    );

    let metrics = Arc::new(Metrics {
        plain: AtomicU64::new(0),
        priority: AtomicU64::new(0),
    });
    bus.subscribe_handler(Arc::clone(&metrics) as HandlerRef<Order>, SubscribeOptions::new());

    // Priority orders only.
    let escalation = bus.subscribe_fn(
        |p: &PriorityOrder, _ctx: &CancellationToken| {
            println!("[escalation] {} due in {}h", p.order.sku, p.deadline_hours);
            Ok(())
        },
        SubscribeOptions::new().exact_type(),
    );

    let ok = bus
        .send_async(Order { sku: "bolt".into(), qty: 12 }, CancellationToken::new())
        .await;
    println!("[main] plain order delivered: {ok}");

    let ok = bus
        .send_async(
            PriorityOrder {
                order: Order { sku: "gear".into(), qty: 3 },
                deadline_hours: 4,
            },
            CancellationToken::new(),
        )
        .await;
    println!("[main] priority order delivered: {ok}");

    let ok = bus
        .send_async(Order { sku: "nut".into(), qty: 0 }, CancellationToken::new())
        .await;
    println!("[main] empty order delivered: {ok}");

    bus.unsubscribe(escalation);
    let ok = bus
        .send_async(
            PriorityOrder {
                order: Order { sku: "cog".into(), qty: 1 },
                deadline_hours: 1,
            },
            CancellationToken::new(),
        )
        .await;
    println!("[main] priority order without escalation delivered: {ok}");

    bus.shutdown_with_grace(std::time::Duration::from_secs(1)).await?;

    println!();
    println!("Metrics:");
    println!(" ├─► Plain:    {}", metrics.plain.load(Ordering::Relaxed));
    println!(" └─► Priority: {}", metrics.priority.load(Ordering::Relaxed));
    Ok(())
}
