//! Ordered, short-circuiting execution of middleware steps.
//!
//! Steps run strictly one after another over the same (request, response) pair. A step that
//! returns [`Flow::Halt`] ends the run successfully with the response it prepared; a step that
//! fails ends it with a [`PipelineError`] and no later step is invoked.

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{MiddlewareError, PipelineError};
use crate::middleware::{Flow, Middleware};
use crate::request::Request;
use crate::response::Response;

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every step returned [`Flow::Continue`].
    Completed,
    /// The step at `step` returned [`Flow::Halt`].
    Halted { step: usize },
}

#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Appends a step; it runs after every step added before.
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.steps.push(Box::new(middleware));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the steps in order until one halts or fails.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Step`] carrying the index and error of the failed step.
    pub async fn run(&self, request: &mut Request, response: &mut Response) -> Result<PipelineOutcome, PipelineError> {
        for (index, step) in self.steps.iter().enumerate() {
            match step.handle(request, response).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Halt) => {
                    debug!(step = index, "pipeline halted");
                    return Ok(PipelineOutcome::Halted { step: index });
                }
                Err(e) => {
                    warn!(step = index, cause = %e, "middleware failed");
                    return Err(PipelineError::Step { index, source: e });
                }
            }
        }

        Ok(PipelineOutcome::Completed)
    }
}

/// A nested pipeline behaves as a single step.
#[async_trait]
impl Middleware for Pipeline {
    async fn handle(&self, request: &mut Request, response: &mut Response) -> Result<Flow, MiddlewareError> {
        match self.run(request, response).await {
            Ok(PipelineOutcome::Completed) => Ok(Flow::Continue),
            Ok(PipelineOutcome::Halted { .. }) => Ok(Flow::Halt),
            Err(e) => Err(MiddlewareError::other(e)),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("steps", &self.steps.len()).finish()
    }
}

#[derive(Debug, Default)]
pub struct PipelineBuilder {
    inner: Pipeline,
}

impl PipelineBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn add_last<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.inner.steps.push(Box::new(middleware));
        self
    }

    pub fn add_first<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.inner.steps.insert(0, Box::new(middleware));
        self
    }

    pub fn build(self) -> Pipeline {
        self.inner
    }
}
