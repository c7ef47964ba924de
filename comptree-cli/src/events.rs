use std::{collections::HashSet, fmt::Display};

use comptree_core::trace_categories;
use tracing_subscriber::{
    Layer, Registry, filter::Targets, layer::SubscriberExt, reload::Handle,
    util::SubscriberInitExt,
};

/// Type of event to trace.
#[derive(Clone, Debug, Eq, Hash, PartialEq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceEvent {
    /// Traces loading of rule files.
    #[clap(name = "load")]
    Load,
    /// Traces construction of the pattern table.
    #[clap(name = "flatten")]
    Flatten,
    /// Traces validation findings.
    #[clap(name = "validate")]
    Validate,
    /// Traces script generation.
    #[clap(name = "emit")]
    Emit,
    /// Traces simulated completion requests.
    #[clap(name = "simulate")]
    Simulate,
    /// Traces installation of generated scripts.
    #[clap(name = "install")]
    Install,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Flatten => write!(f, "flatten"),
            Self::Validate => write!(f, "validate"),
            Self::Emit => write!(f, "emit"),
            Self::Simulate => write!(f, "simulate"),
            Self::Install => write!(f, "install"),
        }
    }
}

impl TraceEvent {
    const fn target(&self) -> &'static str {
        match self {
            Self::Load => trace_categories::LOAD,
            Self::Flatten => trace_categories::FLATTEN,
            Self::Validate => trace_categories::VALIDATE,
            Self::Emit => trace_categories::EMIT,
            Self::Simulate => trace_categories::SIMULATE,
            Self::Install => trace_categories::INSTALL,
        }
    }
}

/// Error returned when the tracing filter cannot be changed.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Tracing was never initialized.
    #[error("tracing not initialized")]
    NotInitialized,
    /// The subscriber rejected the new filter.
    #[error("failed to enable tracing events")]
    ReloadFailed,
}

/// Tracks which events are enabled and holds the handle used to change the
/// active filter after startup.
#[derive(Default)]
pub struct TraceEventConfig {
    enabled_trace_events: HashSet<TraceEvent>,
    handle: Option<Handle<Targets, Registry>>,
}

impl TraceEventConfig {
    /// Installs the global subscriber, writing to stderr.
    ///
    /// # Arguments
    ///
    /// * `enabled_debug_events` - Events to trace at debug level from the start.
    pub fn init(enabled_debug_events: &[TraceEvent]) -> Self {
        let enabled_trace_events: HashSet<TraceEvent> =
            enabled_debug_events.iter().cloned().collect();

        let mut config = Self {
            enabled_trace_events,
            ..Default::default()
        };

        let filter = config.compose_filter();

        // Make the filter reloadable so that the user settings file can add events
        // once it has been read.
        let (reload_filter, handle) = tracing_subscriber::reload::Layer::new(filter);

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(reload_filter);

        if tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .is_ok()
        {
            config.handle = Some(handle);
        } else {
            // Something went wrong; proceed on anyway but complain audibly.
            eprintln!("warning: failed to initialize tracing.");
        }

        config
    }

    fn compose_filter(&self) -> Targets {
        let filter = Targets::new().with_default(tracing_subscriber::filter::LevelFilter::INFO);

        filter.with_targets(
            self.enabled_trace_events
                .iter()
                .map(|event| (event.target(), tracing::Level::DEBUG)),
        )
    }

    /// Returns the events currently traced at debug level.
    pub const fn get_enabled_events(&self) -> &HashSet<TraceEvent> {
        &self.enabled_trace_events
    }

    /// Starts tracing `event` at debug level.
    pub fn enable(&mut self, event: &TraceEvent) -> Result<(), TraceError> {
        // Don't bother to reload config if nothing has changed.
        if !self.enabled_trace_events.insert(event.to_owned()) {
            return Ok(());
        }

        self.reload_filter()
    }

    fn reload_filter(&self) -> Result<(), TraceError> {
        let handle = self.handle.as_ref().ok_or(TraceError::NotInitialized)?;
        handle
            .reload(self.compose_filter())
            .map_err(|_| TraceError::ReloadFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn event_names_match_targets() {
        for event in [
            TraceEvent::Load,
            TraceEvent::Flatten,
            TraceEvent::Validate,
            TraceEvent::Emit,
            TraceEvent::Simulate,
            TraceEvent::Install,
        ] {
            assert_eq!(event.to_string(), event.target());
        }
    }

    #[test]
    fn enable_without_subscriber_fails() {
        let mut config = TraceEventConfig::default();
        assert!(config.enable(&TraceEvent::Emit).is_err());
        assert!(config.get_enabled_events().contains(&TraceEvent::Emit));
        assert!(config.enable(&TraceEvent::Emit).is_ok());
    }
}
