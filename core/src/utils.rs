use rmpv::Value;

/// Look up `key` in a MessagePack map. Nil entries count as absent, the
/// same way a producer's `omitempty` field does.
pub fn map_get<'v>(entries: &'v [(Value, Value)], key: &str) -> Option<&'v Value> {
    entries
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
        .filter(|v| !v.is_nil())
}

/// String field of a MessagePack map.
pub fn map_get_str<'v>(entries: &'v [(Value, Value)], key: &str) -> Option<&'v str> {
    map_get(entries, key).and_then(Value::as_str)
}

/// Short printable prefix of a wire buffer for trace logs.
pub fn fmt_prefix(buf: &[u8], max: usize) -> String {
    let head = &buf[..buf.len().min(max)];
    if buf.len() > max {
        format!("0x{}..", hex::encode(head))
    } else {
        format!("0x{}", hex::encode(head))
    }
}
