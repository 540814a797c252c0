use super::*;

fn data(s: &str) -> SseRecord {
    SseRecord::Data(s.to_string())
}

#[test]
fn single_chunk_multiple_records() {
    let mut decoder = SseDecoder::new();
    let records = decoder.push(b"data: {\"a\":1}\n\ndata: {\"a\":2}\n\n");
    assert_eq!(records, vec![data("{\"a\":1}"), data("{\"a\":2}")]);
    assert_eq!(decoder.push(b"data: {\"a\":3}\n"), vec![data("{\"a\":3}")]);
}

#[test]
fn record_split_across_chunks() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"data: {\"choices\":").is_empty());
    let records = decoder.push(b"[]}\n\n");
    assert_eq!(records, vec![data("{\"choices\":[]}")]);
}

#[test]
fn utf8_sequence_split_across_chunks() {
    let text = "data: {\"t\":\"é\"}\n".as_bytes();
    let split = text.iter().position(|b| *b == 0xC3).unwrap() + 1;
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(&text[..split]).is_empty());
    let records = decoder.push(&text[split..]);
    assert_eq!(records, vec![data("{\"t\":\"é\"}")]);
}

#[test]
fn done_sentinel_stops_decoding() {
    let mut decoder = SseDecoder::new();
    let records = decoder.push(b"data: {\"x\":1}\n\ndata: [DONE]\n\ndata: {\"late\":true}\n\n");
    assert_eq!(records, vec![data("{\"x\":1}"), SseRecord::Done]);
    assert!(decoder.push(b"data: {\"later\":true}\n").is_empty());
    assert!(decoder.finish().is_none());
}

#[test]
fn non_data_lines_ignored() {
    let mut decoder = SseDecoder::new();
    let records = decoder.push(b": keep-alive\nevent: message\nid: 7\ndata:\n\ndata: {}\r\n");
    assert_eq!(records, vec![data("{}")]);
}

#[test]
fn chunk_with_zero_records() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"\n\n").is_empty());
    assert!(decoder.push(b"").is_empty());
}

#[test]
fn finish_flushes_unterminated_line() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"data: {\"tail\":1}").is_empty());
    assert_eq!(decoder.finish(), Some(data("{\"tail\":1}")));
    assert!(decoder.finish().is_none());
}
