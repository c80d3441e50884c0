//! Call-site capture macros.
//!
//! Every macro records `file!()`, `line!()`, `module_path!()` and the name of
//! the enclosing function. The level macros come in two forms:
//!
//! - `info!(dispatcher, "fmt", args..)` submits immediately, like `println!`.
//! - `info!(dispatcher)` returns a [`RecordBuilder`](crate::RecordBuilder)
//!   for `<<` chaining; the record is submitted when the builder drops.
//!
//! `dispatcher` is anything that derefs to a [`Dispatcher`](crate::Dispatcher),
//! including [`global()`](crate::global).
//!
//! # Examples
//!
//! ```
//! use rust_log_dispatcher::prelude::*;
//! use rust_log_dispatcher::{debug, info};
//!
//! let dispatcher = Dispatcher::new("app");
//! dispatcher.add_sink(ConsoleSink::new("console", LogLevel::Debug));
//!
//! info!(dispatcher, "Server listening on port {}", 8080);
//! let _ = debug!(dispatcher) << 1 << "+" << 2 << '=' << 3;
//! ```

/// Name of the enclosing function, as a `&'static str` path.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        match name.strip_suffix("::__here") {
            Some(stripped) => stripped,
            None => name,
        }
    }};
}

/// The [`CallSite`](crate::CallSite) of the invocation.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(
            ::std::file!(),
            $crate::function_name!(),
            ::std::line!(),
            ::std::module_path!(),
        )
    };
}

/// Start a record at `level`, returning its [`RecordBuilder`](crate::RecordBuilder).
///
/// # Examples
///
/// ```
/// # use rust_log_dispatcher::prelude::*;
/// use rust_log_dispatcher::capture;
/// let dispatcher = Dispatcher::new("app");
/// let _ = capture!(dispatcher, LogLevel::Info).flag("startup") << "ready";
/// ```
#[macro_export]
macro_rules! capture {
    ($dispatcher:expr, $level:expr) => {
        $dispatcher.capture($level, $crate::call_site!())
    };
}

/// Log a formatted message at `level`.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatcher::prelude::*;
/// use rust_log_dispatcher::log;
/// let dispatcher = Dispatcher::new("app");
/// log!(dispatcher, LogLevel::Info, "Simple message");
/// log!(dispatcher, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($dispatcher:expr, $level:expr, $($arg:tt)+) => {{
        $crate::capture!($dispatcher, $level).submit_fmt(::std::format_args!($($arg)+));
    }};
}

/// Log at trace level.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatcher::prelude::*;
/// use rust_log_dispatcher::trace;
/// let dispatcher = Dispatcher::new("app");
/// trace!(dispatcher, "Entering function: calculate()");
/// trace!(dispatcher, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($dispatcher:expr $(,)?) => {
        $crate::capture!($dispatcher, $crate::LogLevel::Trace)
    };
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log at debug level.
#[macro_export]
macro_rules! debug {
    ($dispatcher:expr $(,)?) => {
        $crate::capture!($dispatcher, $crate::LogLevel::Debug)
    };
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log at info level.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatcher::prelude::*;
/// use rust_log_dispatcher::info;
/// let dispatcher = Dispatcher::new("app");
/// info!(dispatcher, "Processing {} items", 100);
/// let _ = info!(dispatcher) << "Processing " << 100 << " items";
/// ```
#[macro_export]
macro_rules! info {
    ($dispatcher:expr $(,)?) => {
        $crate::capture!($dispatcher, $crate::LogLevel::Info)
    };
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log at warn level.
#[macro_export]
macro_rules! warn {
    ($dispatcher:expr $(,)?) => {
        $crate::capture!($dispatcher, $crate::LogLevel::Warn)
    };
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log at error level.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatcher::prelude::*;
/// use rust_log_dispatcher::error;
/// error!(global(), "Failed to connect to {}", "db-1");
/// ```
#[macro_export]
macro_rules! error {
    ($dispatcher:expr $(,)?) => {
        $crate::capture!($dispatcher, $crate::LogLevel::Error)
    };
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogLevel::Error, $($arg)+)
    };
}
