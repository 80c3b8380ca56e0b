//! Utility macros

/// Quickly create a [crate::Error::BadCommand] with the user facing reply text.
///
/// ```
/// # use lath::bad_command;
/// let err = bad_command!("unknown command");
///
/// let cmd = "wibble";
/// let err = bad_command!("unknown command: {}", cmd);
/// ```
#[macro_export]
macro_rules! bad_command {
    ($msg:expr) => {
        $crate::Error::BadCommand($msg.to_string())
    };

    ($template:expr, $($arg:expr),+) => {
        $crate::Error::BadCommand(format!($template, $($arg),+))
    };
}

/// Make creating a pre-defined HashMap a little less verbose
///
/// ```
/// # use lath::map;
/// map! {
///     1 => "one",
///     2 => "two",
///     3 => "three",
/// };
/// ```
#[macro_export]
macro_rules! map {
    {} => { ::std::collections::HashMap::new() };

    { $($key:expr => $value:expr),+, } => {
        {
            let mut _map: ::std::collections::HashMap<_, _> = ::std::collections::HashMap::new();
            $(_map.insert($key, $value);)+
            _map
        }
    };
}
