//! Tree-shaped logging of decoded protocol structures.
//!
//! Decoded parameters are turned into a list of [`LogItem`]s (a title, an
//! optional value and an indentation depth) and printed through a
//! [`LogOutput`], which is chosen by the [`Config`](crate::Config).

/// Where decoded structures are written to.
#[derive(Debug, Clone)]
pub enum LogOutput {
    Log(log::Level),
    LogTarget(log::Level, String),
    StdOut,
    StdErr,
    #[cfg(feature = "log-to-file")]
    File(std::sync::Arc<parking_lot::Mutex<std::fs::File>>),
}

impl Default for LogOutput {
    fn default() -> Self {
        Self::Log(log::Level::Info)
    }
}

impl From<log::Level> for LogOutput {
    fn from(value: log::Level) -> Self {
        Self::Log(value)
    }
}

impl LogOutput {
    fn print(&self, msg: &str) {
        match self {
            LogOutput::Log(level) => log::log!(*level, "{}", msg),
            LogOutput::LogTarget(level, target) => {
                log::log!(target: target, *level, "{}", msg)
            }
            LogOutput::StdOut => println!("{}", msg),
            LogOutput::StdErr => eprintln!("{}", msg),
            #[cfg(feature = "log-to-file")]
            LogOutput::File(file) => {
                use std::io::Write;

                let mut file = file.lock();
                file.write_all(msg.as_bytes()).ok();
                file.write_all(b"\n").ok();
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogItem {
    depth: usize,
    title: String,
    value: Option<String>,
}

impl LogItem {
    pub fn new<T: Into<String>, V: Into<String>>(depth: usize, title: T, value: Option<V>) -> Self {
        Self {
            depth,
            title: title.into(),
            value: value.map(Into::into),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl<T: ToString, V: ToString> From<(usize, T, V)> for LogItem {
    fn from((depth, title, value): (usize, T, V)) -> Self {
        Self::new(depth, title.to_string(), Some(value.to_string()))
    }
}

impl<T: ToString> From<(usize, T)> for LogItem {
    fn from((depth, title): (usize, T)) -> Self {
        Self::new::<_, String>(depth, title.to_string(), None)
    }
}

pub struct Logger;

impl Logger {
    pub fn log<T>(output: &LogOutput, loggable: &T)
    where
        T: Loggable,
    {
        Self::render(&loggable.as_log())
            .iter()
            .for_each(|line| output.print(line));
    }

    /// Render `items` into lines. Values of items that share a depth are
    /// aligned on the longest title at that depth.
    fn render(items: &[LogItem]) -> Vec<String> {
        let align_for = |depth: usize| {
            items
                .iter()
                .filter(|i| i.depth == depth && i.value.is_some())
                .map(|i| i.title.len())
                .max()
                .unwrap_or(0)
        };

        items
            .iter()
            .map(|item| {
                let indent = " ".repeat(item.depth * 2);

                match &item.value {
                    Some(value) if !value.is_empty() => {
                        let padding = " ".repeat(align_for(item.depth) - item.title.len());
                        format!("{indent}{}: {padding}{value}", item.title)
                    }
                    _ => format!("{indent}{}", item.title),
                }
            })
            .collect()
    }
}

pub trait Loggable {
    fn as_log(&self) -> Vec<LogItem>;
}

#[macro_export]
macro_rules ! log_vec {
    [$($msg:tt)*] => {
        $crate::to_log!(vec: $($msg)*)
    }
}

#[macro_export]
macro_rules! to_log {
    ([$($array:tt)*],) => {
        vec![$($array)*]
    };

    ([$($array:tt)*], ($depth:literal, $title:expr, $value:expr)) => {
        $crate::to_log!([$($array)* ($depth, $title, $value).into(),],)
    };

    ([$($array:tt)*], ($depth:literal, $title:expr)) => {
        $crate::to_log!([$($array)* ($depth, $title).into(),],)
    };

    ([$($array:tt)*], ($depth:literal, $title:expr, $value:expr), $($msg:tt)*) => {
        $crate::to_log!([$($array)* ($depth, $title, $value).into(),], $($msg)*)
    };

    ([$($array:tt)*], ($depth:literal, $title:expr), $($msg:tt)*) => {
        $crate::to_log!([$($array)* ($depth, $title).into(),], $($msg)*)
    };

    (vec: $($msg:tt)*) => {
        $crate::to_log!([], $($msg)*)
    };
}
