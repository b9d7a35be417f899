//! Delimited-text line tokenizer.

/// Split one line into trimmed field tokens.
///
/// - Fields are separated by `delimiter`; `\r` and `\n` are ordinary bytes here (the builder
///   splits lines before tokenizing).
/// - A field wrapped in `quote` may contain the delimiter; the surrounding quotes are removed
///   (a doubled quote inside a quoted field is an escaped quote). Whitespace before the opening
///   quote or after the closing quote does not matter.
/// - Every token is trimmed of leading/trailing whitespace.
///
/// Malformed quoting never fails: the line is split on a best-effort basis and downstream
/// column-count / type checks catch the resulting shape problems.
pub fn tokenize_line(line: &str, delimiter: u8, quote: u8) -> Vec<String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .quote(quote)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    let raw: Vec<&str> = match rdr.read_record(&mut record) {
        Ok(true) => record.iter().collect(),
        Ok(false) => return vec![String::new()],
        Err(_) => line.split(char::from(delimiter)).collect(),
    };
    rejoin_late_quotes(&raw, char::from(delimiter), char::from(quote))
}

// The reader honours a quote only as the first byte of a field, so `\t "a\tb"` arrives as
// two pieces. Glue such pieces back together up to the piece holding the closing quote.
fn rejoin_late_quotes(raw: &[&str], delimiter: char, quote: char) -> Vec<String> {
    let separator = String::from(delimiter);
    let (single, doubled) = (String::from(quote), [quote, quote].iter().collect::<String>());
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if opens_late_quote(raw[i], quote) {
            if let Some(end) = (i..raw.len()).find(|&j| closes_quote(raw[j], quote, j == i)) {
                let joined = raw[i..=end].join(separator.as_str());
                out.push(strip_quotes(&joined, quote).replace(&doubled, &single));
                i = end + 1;
                continue;
            }
        }
        out.push(strip_quotes(raw[i], quote));
        i += 1;
    }
    out
}

fn opens_late_quote(piece: &str, quote: char) -> bool {
    piece.starts_with(char::is_whitespace) && piece.trim_start().starts_with(quote)
}

fn closes_quote(piece: &str, quote: char, opening: bool) -> bool {
    let rest = if opening {
        &piece.trim_start()[quote.len_utf8()..]
    } else {
        piece
    };
    rest.trim_end().ends_with(quote)
}

// Quotes the reader left in place, e.g. `  "a"  ` where the quote is not the first byte.
fn strip_quotes(token: &str, quote: char) -> String {
    let token = token.trim();
    if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
        token[quote.len_utf8()..token.len() - quote.len_utf8()].trim().to_string()
    } else {
        token.to_string()
    }
}
