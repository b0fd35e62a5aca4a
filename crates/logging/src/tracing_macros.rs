//! crates/logging/src/tracing_macros.rs
//! Convenience macros for pipekit-specific tracing.
//!
//! These macros provide ergonomic wrappers around standard tracing macros
//! with appropriate targets for pipekit subsystems.

/// Emit a task lifecycle trace.
///
/// # Example
/// ```ignore
/// trace_task!("Starting '{}'...", name);
/// ```
#[macro_export]
macro_rules! trace_task {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: $crate::TASK_TARGET, $($arg)*);
    };
}

/// Emit a splice hand-off trace.
///
/// # Example
/// ```ignore
/// trace_splice!("admitted record {}", path.display());
/// ```
#[macro_export]
macro_rules! trace_splice {
    ($($arg:tt)*) => {
        $crate::tracing::trace!(target: $crate::SPLICE_TARGET, $($arg)*);
    };
}

/// Emit a symlink creation trace.
///
/// # Example
/// ```ignore
/// trace_link!("{} -> {}", link.display(), target.display());
/// ```
#[macro_export]
macro_rules! trace_link {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: $crate::LINK_TARGET, $($arg)*);
    };
}

/// Emit a file source trace.
///
/// # Example
/// ```ignore
/// trace_source!("matched {}", relative.display());
/// ```
#[macro_export]
macro_rules! trace_source {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: $crate::SOURCE_TARGET, $($arg)*);
    };
}

/// Emit a destination write trace.
///
/// # Example
/// ```ignore
/// trace_write!("wrote {} bytes to {}", len, path.display());
/// ```
#[macro_export]
macro_rules! trace_write {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: $crate::WRITE_TARGET, $($arg)*);
    };
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing::{Event, Subscriber};
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Clone, Default)]
    struct Targets(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber> Layer<S> for Targets {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0
                .lock()
                .expect("targets lock")
                .push(event.metadata().target().to_owned());
        }
    }

    #[test]
    fn macros_log_under_the_exported_targets() {
        let targets = Targets::default();
        let subscriber = Registry::default().with(targets.clone());
        tracing::subscriber::with_default(subscriber, || {
            trace_task!("task {}", "build");
            trace_splice!("splice {}", 1);
            trace_link!("link {}", "a");
            trace_source!("source {}", "b");
            trace_write!("write {}", 3);
        });

        let seen = targets.0.lock().expect("targets lock").clone();
        assert_eq!(
            seen,
            [
                crate::TASK_TARGET,
                crate::SPLICE_TARGET,
                crate::LINK_TARGET,
                crate::SOURCE_TARGET,
                crate::WRITE_TARGET,
            ]
        );
    }

    #[test]
    fn macros_expand_without_subscriber() {
        trace_task!("task {}", "build");
        trace_splice!("splice {}", 1);
        trace_link!("link {}", "a");
        trace_source!("source {}", "b");
        trace_write!("write {}", 3);
    }
}
