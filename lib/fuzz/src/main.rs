#[macro_use]
extern crate afl;

use field_path::{parse_field_path, serialize_field_path, QuoteMode};

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(src) = std::str::from_utf8(data) {
            fuzz(src);
        }
    });
}

fn fuzz(src: &str) {
    let Ok(path) = parse_field_path(src) else {
        return;
    };

    let quoted = serialize_field_path(&path, QuoteMode::Quoted);
    match parse_field_path(&quoted) {
        Ok(reparsed) if reparsed == path => {}
        Ok(reparsed) => panic!("{src:?} reparsed from {quoted:?} as {reparsed:?}"),
        Err(error) => panic!("{src:?} rendered as {quoted:?}, which fails to parse: {error}"),
    }

    // The other forms only need to render.
    let _ = serialize_field_path(&path, QuoteMode::Natural);
    let _ = serialize_field_path(&path, QuoteMode::Json);
}
