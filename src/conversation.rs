//! The conversation model: the ordered message trace of one exchange attempt.

use core::fmt;

use netboot_dhcp::{v4, v6};

use crate::Family;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Sent,
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => "sent",
            Self::Received => "recvd",
        }
        .fmt(f)
    }
}

/// One protocol message as it appeared on the wire
#[derive(Clone, Debug)]
pub struct Envelope {
    pub direction: Direction,
    pub data: Vec<u8>,
}

impl Envelope {
    /// A one-line human-readable rendering. Messages that no longer decode
    /// still produce a line; a failed exchange's trace is diagnostic data.
    pub fn summary(&self, family: Family) -> String {
        let decoded = match family {
            Family::V4 => v4::Packet::decode(&self.data).map(|packet| packet.to_string()),
            Family::V6 => v6::Message::decode(&self.data).map(|message| message.to_string()),
        };

        match decoded {
            Ok(line) => format!("{} {}", self.direction, line),
            Err(err) => format!(
                "{} <{} bytes, undecodable: {}>",
                self.direction,
                self.data.len(),
                err
            ),
        }
    }
}

/// The ordered sequence of messages exchanged during one negotiation attempt.
///
/// Owned by exactly one attempt: created empty when the attempt starts,
/// appended to in wire order, and handed over whole when the attempt ends —
/// successfully or not.
#[derive(Clone, Debug)]
pub struct Conversation {
    family: Family,
    messages: Vec<Envelope>,
}

impl Conversation {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            messages: Vec::new(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn push_sent(&mut self, data: &[u8]) {
        self.messages.push(Envelope {
            direction: Direction::Sent,
            data: data.to_vec(),
        });
    }

    pub fn push_received(&mut self, data: &[u8]) {
        self.messages.push(Envelope {
            direction: Direction::Received,
            data: data.to_vec(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[Envelope] {
        &self.messages
    }

    /// One summary line per message, in wire order
    pub fn summaries(&self) -> impl Iterator<Item = String> + '_ {
        self.messages
            .iter()
            .map(move |envelope| envelope.summary(self.family))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use netboot_dhcp::v4::{client::Client, Options};

    #[test]
    fn test_summaries_in_wire_order() {
        let mut client = Client {
            rng: rand::thread_rng(),
            mac: [0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5],
        };

        let mut conversation = Conversation::new(Family::V4);

        let mut buf = [0; 1500];
        let mut opt_buf = Options::buf();
        let (discover, _) = client.discover(&mut opt_buf, 0, None);

        conversation.push_sent(discover.encode(&mut buf).unwrap());

        let summaries: Vec<_> = conversation.summaries().collect();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].starts_with("sent DHCPDISCOVER"));
    }

    #[test]
    fn test_undecodable_message_still_summarized() {
        let mut conversation = Conversation::new(Family::V4);
        conversation.push_received(&[0xde, 0xad, 0xbe, 0xef]);

        let summaries: Vec<_> = conversation.summaries().collect();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].contains("undecodable"));
        assert!(summaries[0].starts_with("recvd"));
    }
}
