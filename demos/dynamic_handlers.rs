//! # Example: dynamic_handlers
//!
//! Add and remove handlers while producers keep publishing.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► producer task: send(Tick{n}) every 100ms
//!   │
//!   └─► controller
//!         ├─► subscribe "fast" (detached)
//!         ├─► subscribe_guarded "slow" (inline)
//!         ├─► send_async with a cancelled token → false
//!         ├─► unsubscribe "fast"
//!         ├─► drop guard → "slow" removed
//!         └─► shutdown_with_grace
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=serialbus=trace cargo run --example dynamic_handlers
//! ```

use std::time::Duration;

use serialbus::{message, Bus, BusConfig, Envelope, HandlerError, SubscribeOptions};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct Tick {
    n: u64,
}

message!(Tick);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus = Bus::new(BusConfig::default().with_name("ticks"));
    let stop = CancellationToken::new();

    let producer = {
        let bus = bus.clone();
        let stop = stop.clone();
        tokio::spawn(async move {
            let mut n = 0;
            while !stop.is_cancelled() {
                bus.send(Tick { n });
                n += 1;
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
    };

    println!("[controller] subscribe fast");
    let fast = bus.subscribe_fn(
        |tick: &Tick, _ctx: &CancellationToken| {
            println!("[fast] tick {}", tick.n);
            Ok(())
        },
        SubscribeOptions::new().detached(),
    );

    tokio::time::sleep(Duration::from_millis(350)).await;
    println!("[controller] subscribe slow");
    let slow = bus.subscribe_guarded(
        |tick: Envelope<Tick>, ctx: CancellationToken| async move {
            tokio::select! {
                _ = ctx.cancelled() => return Err(HandlerError::Canceled),
                _ = tokio::time::sleep(Duration::from_millis(20)) => {}
            }
            println!("[slow] tick {}", tick.n);
            Ok(())
        },
        SubscribeOptions::new().inline(),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    let ok = bus.send_async(Tick { n: u64::MAX }, cancel).await;
    println!("[controller] cancelled send delivered: {ok}");

    tokio::time::sleep(Duration::from_millis(350)).await;
    println!("[controller] unsubscribe fast");
    bus.unsubscribe(fast);

    tokio::time::sleep(Duration::from_millis(350)).await;
    println!("[controller] drop slow ({})", slow.id());
    drop(slow);

    tokio::time::sleep(Duration::from_millis(200)).await;
    stop.cancel();
    producer.await?;

    bus.shutdown_with_grace(Duration::from_secs(1)).await?;
    println!("[main] finished: bus closed = {}", bus.is_closed());
    Ok(())
}
