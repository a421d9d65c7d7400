/// Byte offsets of the `?` parameter markers in a raw SQL fragment.
///
/// Markers inside single-quoted strings and double-quoted identifiers are
/// skipped. A doubled quote inside a quoted section is an escaped quote.
pub fn placeholder_positions(sql: &str) -> Vec<usize> {
    let mut positions = vec![];
    let mut quote: Option<u8> = None;
    let bytes = sql.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => {
                if bytes.get(i + 1) == Some(&q) {
                    i += 1;
                } else {
                    quote = None;
                }
            }
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'?' => positions.push(i),
                _ => {}
            },
        }
        i += 1;
    }

    positions
}
