//! Widget providers.
//!
//! A provider is anything that eventually reports a list of
//! [`WidgetDescriptor`]s (or an error) through a one-shot [`Completion`].
//! It may complete synchronously inside [`fetch`](WidgetProvider::fetch)
//! or hand the completion to another thread and finish later.
//!
//! The [`Board`](crate::board::Board) invokes providers strictly one after
//! another (see [`Board::load_widgets`](crate::board::Board::load_widgets)):
//! provider *N + 1* is only invoked once provider *N* has completed, failed
//! or timed out, so provider order is page-filling order.

use crate::widget::WidgetDescriptor;
use log::debug;
use std::sync::mpsc;
use std::time::Duration;

/// Why a provider contributed no widgets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider reported an error of its own.
    #[error("provider failed: {0}")]
    Failed(String),
    /// The provider did not complete within the configured timeout.
    #[error("provider timed out after {0:?}")]
    TimedOut(Duration),
    /// The provider dropped its completion without reporting.
    #[error("provider dropped its completion")]
    Abandoned,
}

/// Result a provider reports.
pub type ProviderResult = Result<Vec<WidgetDescriptor>, ProviderError>;

/// One-shot completion handle passed to [`WidgetProvider::fetch`].
#[derive(Debug)]
pub struct Completion(mpsc::Sender<ProviderResult>);

impl Completion {
    /// Report the provider's widgets.
    pub fn succeed(self, widgets: Vec<WidgetDescriptor>) {
        self.complete(Ok(widgets))
    }

    /// Report a failure.
    pub fn fail(self, reason: impl Into<String>) {
        self.complete(Err(ProviderError::Failed(reason.into())))
    }

    /// Report a result.  Consumes the completion, so a provider can only
    /// report once.
    pub fn complete(self, result: ProviderResult) {
        // The pipeline may have given up (timeout); that's fine.
        let _ = self.0.send(result);
    }
}

/// A source of initial widgets.
///
/// Any `FnMut(Completion) + Send` closure is a provider.
pub trait WidgetProvider: Send {
    /// Start producing widgets and report them through `done`.
    fn fetch(&mut self, done: Completion);
}

impl<F> WidgetProvider for F
where
    F: FnMut(Completion) + Send,
{
    fn fetch(&mut self, done: Completion) {
        self(done)
    }
}

/// A provider with a fixed list of descriptors (for example the
/// `"widgets"` section of the config file).
///
/// The list is handed out on the first fetch; later fetches report nothing.
#[derive(Debug, Default)]
pub struct StaticProvider {
    widgets: Vec<WidgetDescriptor>,
}

impl StaticProvider {
    pub fn new(widgets: Vec<WidgetDescriptor>) -> Self {
        Self { widgets }
    }
}

impl WidgetProvider for StaticProvider {
    fn fetch(&mut self, done: Completion) {
        done.succeed(std::mem::take(&mut self.widgets));
    }
}

/// Invoke one provider and wait for its completion.
pub(crate) fn invoke(provider: &mut dyn WidgetProvider, timeout: Duration) -> ProviderResult {
    let (tx, rx) = mpsc::channel();
    provider.fetch(Completion(tx));
    match rx.recv_timeout(timeout) {
        Ok(result) => {
            if let Ok(widgets) = &result {
                debug!("provider reported {} widget(s)", widgets.len());
            }
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => Err(ProviderError::TimedOut(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(ProviderError::Abandoned),
    }
}
