use op_history::ActorId;

/// The payload a writer appends for its `op_index`-th write, e.g. `00_00002` for the third write
/// of actor 0. Unique per (actor, index) without any coordination between writers.
pub fn write_payload(actor_id: ActorId, op_index: usize) -> String {
    format!("{:02}_{:05}", usize::from(actor_id), op_index)
}

/// Recovers the writer and operation index from a payload built by [`write_payload`].
pub fn parse_payload(payload: &str) -> Option<(ActorId, usize)> {
    let (actor, op_index) = payload.split_once('_')?;
    if actor.len() < 2 || op_index.len() < 5 {
        return None;
    }
    Some((ActorId::from(actor.parse::<usize>().ok()?), op_index.parse().ok()?))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pads_actor_and_index() {
        assert_eq!(write_payload(0.into(), 2), "00_00002");
        assert_eq!(write_payload(13.into(), 12345), "13_12345");
        assert_eq!(write_payload(123.into(), 123456), "123_123456");
    }

    #[test]
    fn parses_back() {
        assert_eq!(parse_payload("04_00031"), Some((4.into(), 31)));
        assert_eq!(parse_payload("123_123456"), Some((123.into(), 123456)));
        assert_eq!(parse_payload(""), None);
        assert_eq!(parse_payload("4_00031"), None);
        assert_eq!(parse_payload("04-00031"), None);
        assert_eq!(parse_payload("04_0003x"), None);
    }
}
