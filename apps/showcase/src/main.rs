use std::sync::Arc;
use std::time::Duration;

use analytics::{AnalyticsSink, EventLog};
use anyhow::Result;
use async_trait::async_trait;
use carousel_core::{
    CarouselConfig, CarouselController, SlideBounds, SlideDeck, SlideInteraction,
};
use clap::Parser;
use shared::domain::NavigationDirection;
use tracing::info;

/// Headless demo: runs the offer carousel against a scripted slide deck and
/// prints the navigation events and analytics it produces.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value_t = 4)]
    slides: usize,
    #[arg(long, default_value_t = 1200)]
    interval_ms: u64,
    #[arg(long, default_value_t = 2000)]
    pause_ms: u64,
}

struct ScriptedDeck {
    offers: Vec<String>,
    container: f64,
    slide_width: f64,
    slide_pitch: f64,
}

impl ScriptedDeck {
    fn new(count: usize) -> Self {
        let offers = (0..count).map(|i| format!("offer-{i}")).collect();
        Self {
            offers,
            container: 1280.0,
            slide_width: 360.0,
            slide_pitch: 384.0,
        }
    }
}

#[async_trait]
impl SlideDeck for ScriptedDeck {
    fn slide_count(&self) -> usize {
        self.offers.len()
    }

    fn container_width(&self) -> f64 {
        self.container
    }

    fn slide_bounds(&self, index: usize) -> Option<SlideBounds> {
        (index < self.offers.len()).then(|| SlideBounds {
            left: index as f64 * self.slide_pitch,
            width: self.slide_width,
        })
    }

    fn offer_tag(&self, index: usize) -> Option<String> {
        self.offers.get(index).cloned()
    }

    async fn scroll_to(&self, offset: f64) {
        info!(offset, "deck scrolled");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let config = CarouselConfig {
        auto_advance_interval: Duration::from_millis(args.interval_ms),
        user_pause_duration: Duration::from_millis(args.pause_ms),
        ..CarouselConfig::default()
    };
    let deck = Arc::new(ScriptedDeck::new(args.slides));
    let log = Arc::new(EventLog::new());

    let controller = CarouselController::start(
        Arc::clone(&deck) as Arc<dyn SlideDeck>,
        Arc::clone(&log) as Arc<dyn AnalyticsSink>,
        config,
    )
    .await?;

    let mut events = controller.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("carousel event: {event:?}");
        }
    });

    // let the controller settle on slide 0, then watch one auto-advance
    tokio::time::sleep(Duration::from_millis(400 + args.interval_ms)).await;

    println!("-- pointer hovers over the deck --");
    controller
        .handle_interaction(SlideInteraction::HoverStart)
        .await;
    tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
    controller
        .handle_interaction(SlideInteraction::HoverEnd)
        .await;

    println!("-- visitor clicks slide 1 --");
    controller
        .handle_interaction(SlideInteraction::Click { index: 1 })
        .await;
    tokio::time::sleep(Duration::from_millis(args.pause_ms + 100)).await;

    println!("-- visitor steps through with the keyboard --");
    controller
        .handle_interaction(SlideInteraction::ArrowKey(NavigationDirection::Next))
        .await;
    controller
        .handle_interaction(SlideInteraction::ArrowKey(NavigationDirection::Previous))
        .await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    controller.shutdown().await;
    printer.abort();

    println!("final slide index: {}", controller.current_index().await);
    println!(
        "analytics snapshot: {}",
        serde_json::to_string_pretty(&log.snapshot())?
    );

    Ok(())
}
