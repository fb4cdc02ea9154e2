//! Logging macros
//!
//! Context values accept anything implementing `Display`:
//!
//! ```ignore
//! log_error!(codes::lexical::LINE_TOO_LONG, "Line too long", span = span, "length" => len);
//! ```

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::dispatch($crate::logging::LogEvent::error($code, $message))
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::error($code, $message).with_span($span),
        )
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::error($code, $message);
        $( event = event.with_context($key, &::std::format!("{}", $value)); )+
        $crate::logging::dispatch(event)
    }};

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::error($code, $message).with_span($span);
        $( event = event.with_context($key, &::std::format!("{}", $value)); )+
        $crate::logging::dispatch(event)
    }};
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::dispatch($crate::logging::LogEvent::success($code, $message))
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::success($code, $message);
        $( event = event.with_context($key, &::std::format!("{}", $value)); )+
        $crate::logging::dispatch(event)
    }};
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::dispatch($crate::logging::LogEvent::info($message))
    };

    ($message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::info($message);
        $( event = event.with_context($key, &::std::format!("{}", $value)); )+
        $crate::logging::dispatch(event)
    }};
}

/// Warning with an optional registered code: `log_warning!(code = c, "msg", ...)`
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr) => {
        $crate::logging::dispatch($crate::logging::LogEvent::warning_with_code($code, $message))
    };

    (code = $code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::dispatch(
            $crate::logging::LogEvent::warning_with_code($code, $message).with_span($span),
        )
    };

    (code = $code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {{
        let mut event =
            $crate::logging::LogEvent::warning_with_code($code, $message).with_span($span);
        $( event = event.with_context($key, &::std::format!("{}", $value)); )+
        $crate::logging::dispatch(event)
    }};

    ($message:expr) => {
        $crate::logging::dispatch($crate::logging::LogEvent::warning($message))
    };

    ($message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::warning($message);
        $( event = event.with_context($key, &::std::format!("{}", $value)); )+
        $crate::logging::dispatch(event)
    }};
}

/// Debug events skip formatting entirely unless debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::dispatch($crate::logging::LogEvent::debug($message))
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::debug_enabled() {
            let mut event = $crate::logging::LogEvent::debug($message);
            $( event = event.with_context($key, &::std::format!("{}", $value)); )+
            $crate::logging::dispatch(event)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_macros_expand_without_global_logger() {
        let span = Span::new(Position::new(0, 1, 1), Position::new(4, 1, 5));

        crate::log_error!(codes::lexical::LINE_TOO_LONG, "too long");
        crate::log_error!(codes::lexical::LINE_TOO_LONG, "too long", span = span);
        crate::log_error!(codes::lexical::LINE_TOO_LONG, "too long", "line" => 4, "length" => 70_000);
        crate::log_error!(
            codes::lexical::LINE_TOO_LONG,
            "too long",
            span = span,
            "line" => 4
        );
        crate::log_success!(codes::success::TOKENIZATION_COMPLETE, "done", "tokens" => 12);
        crate::log_info!("scanning", "lines" => 3);
        crate::log_warning!("plain warning");
        crate::log_warning!(code = codes::lexical::UNTERMINATED_STRING, "open", span = span, "quote" => '"');
        crate::log_debug!("debug", "state" => "in_string");
    }
}
