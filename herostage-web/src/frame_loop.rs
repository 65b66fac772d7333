use std::cell::Cell;
use std::rc::Rc;

use crate::error::StageError;

/// Shared stop flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Source of display-synchronized frame callbacks (requestAnimationFrame in
/// the browser).
pub trait FrameScheduler {
    /// Handle identifying one scheduled callback.
    type Request;

    fn request_frame(&mut self) -> Result<Self::Request, StageError>;

    fn cancel_frame(&mut self, request: Self::Request);
}

#[derive(Debug)]
enum LoopState<R> {
    Idle,
    Running { pending: Option<R> },
    Cancelled,
}

/// Keeps exactly one frame callback outstanding while running.
#[derive(Debug)]
pub struct FrameLoop<S: FrameScheduler> {
    scheduler: S,
    state: LoopState<S::Request>,
    token: CancellationToken,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: LoopState::Idle,
            token: CancellationToken::new(),
        }
    }

    /// Schedule the first frame. Returns `false` if the loop was already
    /// started or has been cancelled.
    pub fn start(&mut self) -> Result<bool, StageError> {
        if self.token.is_cancelled() {
            self.state = LoopState::Cancelled;
            return Ok(false);
        }
        match self.state {
            LoopState::Idle => {
                let request = self.scheduler.request_frame()?;
                self.state = LoopState::Running {
                    pending: Some(request),
                };
                Ok(true)
            }
            LoopState::Running { .. } | LoopState::Cancelled => Ok(false),
        }
    }

    /// Called at the top of every frame callback. Retires the request that
    /// just fired and schedules the next one before any frame work runs.
    /// Returns `false` when the frame should be skipped. A scheduling
    /// failure stops the loop.
    pub fn begin_frame(&mut self) -> Result<bool, StageError> {
        if self.token.is_cancelled() {
            self.state = LoopState::Cancelled;
            return Ok(false);
        }
        if !matches!(self.state, LoopState::Running { .. }) {
            return Ok(false);
        }

        // The request that fired is spent; nothing is pending until the
        // next one is granted
        match self.scheduler.request_frame() {
            Ok(request) => {
                self.state = LoopState::Running {
                    pending: Some(request),
                };
                Ok(true)
            }
            Err(e) => {
                self.state = LoopState::Cancelled;
                Err(e)
            }
        }
    }

    /// Stop the loop and withdraw the outstanding request.
    pub fn cancel(&mut self) {
        self.token.cancel();
        let state = std::mem::replace(&mut self.state, LoopState::Cancelled);
        if let LoopState::Running {
            pending: Some(request),
        } = state
        {
            self.scheduler.cancel_frame(request);
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. }) && !self.token.is_cancelled()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
