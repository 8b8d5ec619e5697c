use rand_core::RngCore;

use super::*;

/// Client-side identity and reply classification for DHCPv6.
///
/// Message construction happens at the call site (nested IA options borrow
/// from buffers the caller owns); the client contributes the stable pieces:
/// DUID, IAID and transaction ids, and decides which replies are ours.
pub struct Client<T> {
    pub rng: T,
    pub mac: [u8; 6],
}

impl<T> Client<T>
where
    T: RngCore,
{
    /// DUID-LL (RFC 8415 Section 11.4): hardware type 1 (Ethernet) + MAC
    pub fn duid(&self) -> [u8; 10] {
        let mut duid = [0; 10];

        duid[..4].copy_from_slice(&[0, 3, 0, 1]);
        duid[4..].copy_from_slice(&self.mac);

        duid
    }

    /// A fixed IAID derived from the low MAC bytes, stable across runs
    pub fn iaid(&self) -> u32 {
        u32::from_be_bytes([self.mac[2], self.mac[3], self.mac[4], self.mac[5]])
    }

    /// A fresh 24-bit transaction id
    pub fn next_xid(&mut self) -> u32 {
        self.rng.next_u32() & 0x00ff_ffff
    }

    pub fn is_advertise(&self, reply: &Message<'_>, xid: u32) -> bool {
        self.is_reply_for_us(reply, xid, Some(&[MessageType::Advertise]))
    }

    pub fn is_reply(&self, reply: &Message<'_>, xid: u32) -> bool {
        self.is_reply_for_us(reply, xid, Some(&[MessageType::Reply]))
    }

    pub fn is_reply_for_us(
        &self,
        reply: &Message<'_>,
        xid: u32,
        expected_message_types: Option<&[MessageType]>,
    ) -> bool {
        if reply.xid != xid || reply.client_id() != Some(&self.duid()[..]) {
            return false;
        }

        if let Some(expected_message_types) = expected_message_types {
            expected_message_types
                .iter()
                .any(|emt| *emt == reply.msg_type)
        } else {
            true
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct StepRng(u32);

    impl RngCore for StepRng {
        fn next_u32(&mut self) -> u32 {
            self.0 = self.0.wrapping_add(1);
            self.0
        }

        fn next_u64(&mut self) -> u64 {
            self.next_u32() as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    const MAC: [u8; 6] = [0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5];

    #[test]
    fn test_identity() {
        let client = Client {
            rng: StepRng(0),
            mac: MAC,
        };

        assert_eq!(
            client.duid(),
            [0, 3, 0, 1, 0x4c, 0xcc, 0x6a, 0xa2, 0x23, 0xf5]
        );
        assert_eq!(client.iaid(), 0x6aa223f5);
    }

    #[test]
    fn test_xid_is_24_bit() {
        let mut client = Client {
            rng: StepRng(0xfeff_fffe),
            mac: MAC,
        };

        assert!(client.next_xid() <= 0x00ff_ffff);
    }

    #[test]
    fn test_reply_classification() {
        let mut client = Client {
            rng: StepRng(0),
            mac: MAC,
        };

        let xid = client.next_xid();
        let duid = client.duid();

        let options = [DhcpOption::ClientId(&duid)];
        let advertise = Message::new(MessageType::Advertise, xid, Options::new(&options));

        assert!(client.is_advertise(&advertise, xid));
        assert!(!client.is_reply(&advertise, xid));
        assert!(!client.is_advertise(&advertise, xid + 1));

        // a reply holding someone else's DUID is not ours
        let foreign = [DhcpOption::ClientId(&[0, 3, 0, 1, 9, 9, 9, 9, 9, 9])];
        let stray = Message::new(MessageType::Advertise, xid, Options::new(&foreign));

        assert!(!client.is_advertise(&stray, xid));
    }
}
