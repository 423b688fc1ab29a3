use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use analytics::AnalyticsSink;
use async_trait::async_trait;
use shared::{
    domain::{InteractionSource, NavigationDirection},
    protocol::AnalyticsRecord,
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info};

const DEFAULT_AUTO_ADVANCE_INTERVAL: Duration = Duration::from_millis(3500);
const DEFAULT_USER_PAUSE_DURATION: Duration = Duration::from_millis(6000);
/// Delay before the first navigation so the deck layout can stabilize.
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);
const DEFAULT_RESIZE_SETTLE_DELAY: Duration = Duration::from_millis(120);

#[derive(Debug, Error)]
pub enum CarouselError {
    #[error("carousel needs at least 2 slides to run, got {slide_count}")]
    InvalidConfiguration { slide_count: usize },
}

#[derive(Debug, Clone)]
pub struct CarouselConfig {
    pub auto_advance_interval: Duration,
    pub user_pause_duration: Duration,
    pub settle_delay: Duration,
    pub resize_settle_delay: Duration,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            auto_advance_interval: DEFAULT_AUTO_ADVANCE_INTERVAL,
            user_pause_duration: DEFAULT_USER_PAUSE_DURATION,
            settle_delay: DEFAULT_SETTLE_DELAY,
            resize_settle_delay: DEFAULT_RESIZE_SETTLE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideBounds {
    pub left: f64,
    pub width: f64,
}

/// Rendering-layer seam: an ordered deck of slide regions with stable
/// geometry that accepts smooth scroll commands. The deck is immutable for
/// the controller's lifetime.
#[async_trait]
pub trait SlideDeck: Send + Sync {
    fn slide_count(&self) -> usize;
    fn container_width(&self) -> f64;
    fn slide_bounds(&self, index: usize) -> Option<SlideBounds>;
    /// Offer tag attached to a slide, used to label click analytics.
    fn offer_tag(&self, index: usize) -> Option<String>;
    async fn scroll_to(&self, offset: f64);
}

/// Raw interaction events forwarded from the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlideInteraction {
    HoverStart,
    HoverEnd,
    FocusIn,
    FocusOut,
    Click { index: usize },
    Wheel,
    TouchStart,
    ArrowKey(NavigationDirection),
    Resize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CarouselEvent {
    Navigated { index: usize },
    Paused { source: InteractionSource },
    Resumed,
    Recentered { index: usize },
}

struct CarouselState {
    current_index: usize,
    paused: bool,
    paused_at: Option<Instant>,
}

/// Arbitrates automatic slide advancement against user interactions.
///
/// One auto-advance timer and one pending delayed-resume timer exist at
/// most; starting either always aborts its predecessor first. Pausing stops
/// the auto-advance task outright; the in-tick pause check only covers the
/// window where a tick is already in flight when a pause lands.
pub struct CarouselController {
    deck: Arc<dyn SlideDeck>,
    sink: Arc<dyn AnalyticsSink>,
    config: CarouselConfig,
    slide_count: usize,
    inner: Mutex<CarouselState>,
    auto_task: Mutex<Option<JoinHandle<()>>>,
    resume_task: Mutex<Option<JoinHandle<()>>>,
    recenter_task: Mutex<Option<JoinHandle<()>>>,
    settle_task: Mutex<Option<JoinHandle<()>>>,
    interaction_task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<CarouselEvent>,
    active: AtomicBool,
}

impl CarouselController {
    /// Validates the deck and schedules startup: after a short settle delay
    /// the controller navigates to slide 0 and begins auto-advancing.
    pub async fn start(
        deck: Arc<dyn SlideDeck>,
        sink: Arc<dyn AnalyticsSink>,
        config: CarouselConfig,
    ) -> Result<Arc<Self>, CarouselError> {
        let slide_count = deck.slide_count();
        if slide_count < 2 {
            return Err(CarouselError::InvalidConfiguration { slide_count });
        }

        let (events, _) = broadcast::channel(64);
        let controller = Arc::new(Self {
            deck,
            sink,
            config,
            slide_count,
            inner: Mutex::new(CarouselState {
                current_index: 0,
                paused: false,
                paused_at: None,
            }),
            auto_task: Mutex::new(None),
            resume_task: Mutex::new(None),
            recenter_task: Mutex::new(None),
            settle_task: Mutex::new(None),
            interaction_task: Mutex::new(None),
            events,
            active: AtomicBool::new(true),
        });

        let settle = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                tokio::time::sleep(controller.config.settle_delay).await;
                controller.navigate_to(0).await;
                controller.start_auto_advance().await;
            })
        };
        *controller.settle_task.lock().await = Some(settle);

        info!(slide_count, "carousel started");
        Ok(controller)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CarouselEvent> {
        self.events.subscribe()
    }

    pub async fn current_index(&self) -> usize {
        self.inner.lock().await.current_index
    }

    pub async fn is_paused(&self) -> bool {
        self.inner.lock().await.paused
    }

    /// Consume interaction events from the rendering layer until the sender
    /// side closes. Replaces any previously attached stream.
    pub async fn attach_interactions(
        self: &Arc<Self>,
        mut interactions: broadcast::Receiver<SlideInteraction>,
    ) {
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            while let Ok(interaction) = interactions.recv().await {
                controller.handle_interaction(interaction).await;
            }
        });
        let mut guard = self.interaction_task.lock().await;
        if let Some(previous) = guard.replace(task) {
            previous.abort();
        }
    }

    /// Wraps out-of-range indexes (negative included) and issues a smooth
    /// centering scroll to the deck. Navigation never touches pause state.
    pub async fn navigate_to(&self, index: i64) {
        let wrapped = index.rem_euclid(self.slide_count as i64) as usize;
        if let Some(target) = self.centering_offset(wrapped) {
            self.deck.scroll_to(target).await;
        }
        {
            let mut state = self.inner.lock().await;
            state.current_index = wrapped;
        }
        let _ = self.events.send(CarouselEvent::Navigated { index: wrapped });
    }

    pub async fn advance_to_next(&self) {
        let next = {
            let state = self.inner.lock().await;
            (state.current_index + 1) % self.slide_count
        };
        self.navigate_to(next as i64).await;
    }

    /// Idempotent: a repeat call while already paused just refreshes the
    /// pause timestamp.
    pub async fn pause_for_user_interaction(&self, source: InteractionSource) {
        {
            let mut state = self.inner.lock().await;
            state.paused = true;
            state.paused_at = Some(Instant::now());
        }
        self.stop_auto_advance().await;
        debug!(?source, "auto-advance paused");
        let _ = self.events.send(CarouselEvent::Paused { source });
    }

    /// Idempotent. The restarted timer begins a full interval from now; a
    /// partial tick from before the pause is never resumed.
    pub async fn resume_auto_advance(self: &Arc<Self>) {
        {
            let mut state = self.inner.lock().await;
            state.paused = false;
            state.paused_at = None;
        }
        self.start_auto_advance().await;
        debug!("auto-advance resumed");
        let _ = self.events.send(CarouselEvent::Resumed);
    }

    /// One pending resume at a time: scheduling again pushes the resume
    /// further out instead of queueing a second one.
    pub async fn schedule_resume_after(self: &Arc<Self>, delay: Duration) {
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.resume_auto_advance().await;
        });
        let mut guard = self.resume_task.lock().await;
        if let Some(previous) = guard.replace(task) {
            previous.abort();
        }
    }

    pub async fn handle_interaction(self: &Arc<Self>, interaction: SlideInteraction) {
        match interaction {
            SlideInteraction::HoverStart => {
                self.pause_for_user_interaction(InteractionSource::Hover)
                    .await;
            }
            SlideInteraction::HoverEnd => self.resume_auto_advance().await,
            SlideInteraction::FocusIn => {
                self.pause_for_user_interaction(InteractionSource::Focus)
                    .await;
            }
            SlideInteraction::FocusOut => self.resume_auto_advance().await,
            SlideInteraction::Click { index } => {
                self.pause_for_user_interaction(InteractionSource::Click)
                    .await;
                self.schedule_resume_after(self.config.user_pause_duration)
                    .await;
                if let Some(offer) = self.deck.offer_tag(index) {
                    self.sink
                        .push(AnalyticsRecord::named("offer_click").with_field("offer", offer));
                }
            }
            SlideInteraction::Wheel => {
                self.pause_for_user_interaction(InteractionSource::Wheel)
                    .await;
                self.schedule_resume_after(self.config.user_pause_duration)
                    .await;
            }
            // Touch and arrow-key pauses never schedule a resume; the
            // carousel stays paused until another interaction resumes it.
            SlideInteraction::TouchStart => {
                self.pause_for_user_interaction(InteractionSource::Touch)
                    .await;
            }
            SlideInteraction::ArrowKey(direction) => {
                self.pause_for_user_interaction(InteractionSource::ArrowKey)
                    .await;
                let current = self.current_index().await as i64;
                let target = match direction {
                    NavigationDirection::Next => current + 1,
                    NavigationDirection::Previous => current - 1,
                };
                self.navigate_to(target).await;
            }
            SlideInteraction::Resize => self.handle_viewport_resize().await,
        }
    }

    /// Re-centers the current slide after the container has reflowed.
    /// Pause state is untouched; repeated resizes replace the pending
    /// re-center.
    pub async fn handle_viewport_resize(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(controller.config.resize_settle_delay).await;
            let index = controller.current_index().await;
            if let Some(target) = controller.centering_offset(index) {
                controller.deck.scroll_to(target).await;
            }
            let _ = controller.events.send(CarouselEvent::Recentered { index });
        });
        let mut guard = self.recenter_task.lock().await;
        if let Some(previous) = guard.replace(task) {
            previous.abort();
        }
    }

    pub async fn shutdown(&self) {
        for slot in [
            &self.settle_task,
            &self.auto_task,
            &self.resume_task,
            &self.recenter_task,
            &self.interaction_task,
        ] {
            if let Some(task) = slot.lock().await.take() {
                task.abort();
            }
        }
        self.active.store(false, Ordering::SeqCst);
    }

    async fn start_auto_advance(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        let period = self.config.auto_advance_interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // the first interval tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if controller.tick_should_skip().await {
                    continue;
                }
                controller.advance_to_next().await;
            }
        });
        let mut guard = self.auto_task.lock().await;
        if let Some(previous) = guard.replace(task) {
            previous.abort();
        }
    }

    async fn stop_auto_advance(&self) {
        if let Some(task) = self.auto_task.lock().await.take() {
            task.abort();
        }
    }

    // A tick that is already in flight when a pause lands must not navigate
    // while the pause window is open.
    async fn tick_should_skip(&self) -> bool {
        let state = self.inner.lock().await;
        state.paused
            && state
                .paused_at
                .is_some_and(|at| at.elapsed() < self.config.user_pause_duration)
    }

    fn centering_offset(&self, index: usize) -> Option<f64> {
        let bounds = self.deck.slide_bounds(index)?;
        let container = self.deck.container_width();
        Some((bounds.left - (container - bounds.width) / 2.0).max(0.0))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
