use rand_core::RngCore;

use super::*;

/// A simple DHCPv4 client.
/// The client is unaware of the IP/UDP transport layer and operates purely in
/// terms of packets represented as Rust slices.
pub struct Client<T> {
    pub rng: T,
    pub mac: [u8; 6],
}

impl<T> Client<T>
where
    T: RngCore,
{
    pub fn discover<'o>(
        &mut self,
        opt_buf: &'o mut [DhcpOption<'o>],
        secs: u16,
        requested_ip: Option<Ipv4Addr>,
    ) -> (Packet<'o>, u32) {
        self.bootp_request(secs, Options::discover(requested_ip, opt_buf))
    }

    /// The REQUEST confirms the offered address with the server that made the
    /// offer, which is why the server identifier travels along.
    pub fn request<'o>(
        &mut self,
        opt_buf: &'o mut [DhcpOption<'o>],
        secs: u16,
        ip: Ipv4Addr,
        server_ip: Ipv4Addr,
    ) -> (Packet<'o>, u32) {
        self.bootp_request(secs, Options::request(ip, server_ip, opt_buf))
    }

    pub fn is_offer(&self, reply: &Packet<'_>, xid: u32) -> bool {
        self.is_bootp_reply_for_us(reply, xid, Some(&[MessageType::Offer]))
    }

    pub fn is_ack(&self, reply: &Packet<'_>, xid: u32) -> bool {
        self.is_bootp_reply_for_us(reply, xid, Some(&[MessageType::Ack]))
    }

    pub fn is_nak(&self, reply: &Packet<'_>, xid: u32) -> bool {
        self.is_bootp_reply_for_us(reply, xid, Some(&[MessageType::Nak]))
    }

    pub fn bootp_request<'o>(&mut self, secs: u16, options: Options<'o>) -> (Packet<'o>, u32) {
        let xid = self.rng.next_u32();

        (Packet::new_request(self.mac, xid, secs, options), xid)
    }

    pub fn is_bootp_reply_for_us(
        &self,
        reply: &Packet<'_>,
        xid: u32,
        expected_message_types: Option<&[MessageType]>,
    ) -> bool {
        if reply.reply && reply.is_for_us(&self.mac, xid) {
            if let Some(expected_message_types) = expected_message_types {
                let mt = reply.message_type();

                expected_message_types.iter().any(|emt| mt == Some(*emt))
            } else {
                true
            }
        } else {
            false
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
    fn test_request_carries_server_id() {
        let mut client = Client {
            rng: StepRng(0),
            mac: MAC,
        };

        let mut opt_buf = Options::buf();
        let (request, xid) = client.request(
            &mut opt_buf,
            0,
            Ipv4Addr::new(10, 0, 0, 5),
            Ipv4Addr::new(10, 0, 0, 1),
        );

        assert_eq!(request.xid, xid);
        assert_eq!(request.message_type(), Some(MessageType::Request));

        let server = request.options.iter().find_map(|option| {
            if let DhcpOption::ServerIdentifier(ip) = option {
                Some(ip)
            } else {
                None
            }
        });
        assert_eq!(server, Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_reply_classification() {
        let mut client = Client {
            rng: StepRng(0),
            mac: MAC,
        };

        let mut opt_buf = Options::buf();
        let (_, xid) = client.discover(&mut opt_buf, 0, None);

        let options = [DhcpOption::MessageType(MessageType::Offer)];
        let mut offer = Packet::new_request(MAC, xid, 0, Options::new(&options));
        offer.reply = true;

        assert!(client.is_offer(&offer, xid));
        assert!(!client.is_ack(&offer, xid));
        assert!(!client.is_offer(&offer, xid.wrapping_add(1)));
    }
}
