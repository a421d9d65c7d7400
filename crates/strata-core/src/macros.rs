/// Builds a [`Record`](crate::stmt::Record) from `name => value` pairs.
///
/// ```
/// let record = strata_core::record! {
///     "title" => "Hello",
///     "views" => 3,
/// };
/// assert_eq!(record.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::stmt::Record::new()
    };
    ( $( $name:expr => $value:expr ),+ $(,)? ) => {{
        let mut record = $crate::stmt::Record::new();
        $( record.insert($name, $value); )+
        record
    }};
}
