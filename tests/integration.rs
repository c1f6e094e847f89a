//! End-to-end exercises: a full client-driven exchange over a capture
//! transport, plus frame-level checks on the assembled messages.

use wsp_client::codec::VType;
use wsp_client::protocol::{
    checksum, frame, Header, MessageType, SeekDescription, HEADER_SIZE,
};
use wsp_client::transport::Transport;
use wsp_client::{BuilderConfig, MessageBuilder, Result, SessionState};

const CONFIG: &str = r#"{
    "catalog_name": "Windows\\SystemIndex",
    "client_machine_name": "client-box",
    "server_machine_name": "server-box",
    "user_name": "tester",
    "language_locale": "en-US",
    "lcid": 1033,
    "each_row_size": 72,
    "rows_to_transfer": 40,
    "read_buffer_size": 16384,
    "propset_one_ids": [2, 3, 4, 7],
    "propset_two_ids": [2],
    "ext_propset_one_guid": "aa6ee6b0-e828-11d0-b23e-00aa0047fc01",
    "ext_propset_one_ids": [2, 3, 4, 5, 6, 7],
    "ext_propset_two_guid": "a7ac77ed-f8d7-11ce-a798-0020f8008025",
    "ext_propset_two_ids": [2, 3, 4, 5, 6, 8, 10, 12, 13, 14],
    "ext_propset_three_guid": "a9bd1526-6a80-11d0-8c9d-0020af1d740e",
    "ext_propset_three_ids": [2],
    "ext_propset_four_guid": "afafaca5-b5d1-11d0-8c62-00c04fc2db8d",
    "ext_propset_four_ids": [2, 3, 4],
    "columns": [
        {
            "guid": "b725f130-47ef-101a-a5f1-02608c9eebac",
            "property_id": 10,
            "vtype": 31,
            "value_offset": 0,
            "status_offset": 8,
            "length_offset": 12
        },
        {
            "guid": "b725f130-47ef-101a-a5f1-02608c9eebac",
            "property_id": 2,
            "vtype": 31,
            "value_offset": 16,
            "status_offset": 24,
            "length_offset": 28
        }
    ]
}"#;

fn builder() -> MessageBuilder {
    MessageBuilder::new(BuilderConfig::from_json_str(CONFIG).expect("config"))
}

fn u32_at(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

/// Records every request and answers each with a bare success header
/// echoing the request's message code.
#[derive(Default)]
struct CaptureTransport {
    sent: Vec<Vec<u8>>,
}

impl Transport for CaptureTransport {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        let header = Header::decode(request).expect("well-formed request");
        self.sent.push(request.to_vec());
        let reply = Header {
            msg: header.msg,
            status: 0,
            checksum: 0,
            reserved: 0,
        };
        Ok(reply.encode().to_vec())
    }
}

#[test]
fn test_get_rows_request_decodes_field_by_field() {
    let framed = builder()
        .get_rows_in(7, 3, 72, 16384, 0, false, SeekDescription::Next { skip: 0 })
        .unwrap();

    let header = Header::decode(&framed).unwrap();
    assert_eq!(header.msg, MessageType::GetRowsIn.code());
    assert_eq!(header.status, 0);
    assert_eq!(header.reserved, 0);

    let p = &framed[HEADER_SIZE..];
    assert_eq!(u32_at(p, 0), 7, "cursor");
    assert_eq!(u32_at(p, 4), 3, "rows to transfer");
    assert_eq!(u32_at(p, 8), 72, "row width");
    assert_eq!(u32_at(p, 12), 4, "seek description size");
    assert_eq!(u32_at(p, 16), 256, "reserved block size");
    assert_eq!(u32_at(p, 20), 16384, "read buffer");
    assert_eq!(u32_at(p, 24), 0, "client base");
    assert_eq!(u32_at(p, 28), 0, "forward fetch");
    assert_eq!(u32_at(p, 32), 1, "seek mode");
    assert_eq!(u32_at(p, 36), 0, "chapter");
    assert_eq!(u32_at(p, 40), 0, "skip count");
    assert_eq!(p.len(), 44);
}

#[test]
fn test_checksum_detects_payload_corruption() {
    let framed = builder()
        .get_rows_in(7, 3, 72, 16384, 0, false, SeekDescription::Next { skip: 0 })
        .unwrap();
    let header = Header::decode(&framed).unwrap();
    let payload = &framed[HEADER_SIZE..];

    assert_eq!(header.checksum, checksum(MessageType::GetRowsIn, payload));

    // The same payload always produces the same checksum.
    let again = builder()
        .get_rows_in(7, 3, 72, 16384, 0, false, SeekDescription::Next { skip: 0 })
        .unwrap();
    assert_eq!(framed, again);

    // Flipping any single payload bit changes it.
    for byte in 0..payload.len() {
        let mut corrupted = payload.to_vec();
        corrupted[byte] ^= 0x01;
        assert_ne!(
            header.checksum,
            checksum(MessageType::GetRowsIn, &corrupted),
            "corruption at byte {byte} went unnoticed"
        );
    }
}

#[test]
fn test_framing_pads_checksummed_payloads() {
    // 5-byte payload on a checksummed message pads to 8 plus the header.
    let framed = frame(MessageType::FetchValueIn, &[1, 2, 3, 4, 5]);
    assert_eq!(framed.len(), HEADER_SIZE + 8);
    assert_eq!(&framed[HEADER_SIZE + 5..], &[0, 0, 0]);

    // Non-checksummed messages are not padded.
    let bare = frame(MessageType::FreeCursorIn, &[1, 2, 3, 4, 5]);
    assert_eq!(bare.len(), HEADER_SIZE + 5);
    assert_eq!(Header::decode(&bare).unwrap().checksum, 0);
}

#[test]
fn test_full_query_exchange_over_capture_transport() {
    let builder = builder();
    let mut transport = CaptureTransport::default();
    let mut session = SessionState::new();

    let connect = builder
        .connect_in(
            0x00000102,
            true,
            &builder.config().user_name,
            &builder.config().client_machine_name,
        )
        .unwrap();
    transport.send(&connect).unwrap();

    transport
        .send(&builder.create_query_in("C:\\corpus", "quick fox", false).unwrap())
        .unwrap();
    // Cursor handle would come from the reply body; use a fixed one here.
    session.advance_cursor(7);

    let bindings = builder.bindings_from_config().unwrap();
    let width = builder.config().each_row_size;
    transport
        .send(&builder.set_bindings_in(session.cursor(), width, &bindings).unwrap())
        .unwrap();
    session.set_row_width(width);
    session.record_bindings(bindings);

    transport
        .send(
            &builder
                .get_rows_in(
                    session.cursor(),
                    builder.config().rows_to_transfer,
                    session.row_width(),
                    builder.config().read_buffer_size,
                    session.chapter(),
                    false,
                    SeekDescription::Next { skip: 0 },
                )
                .unwrap(),
        )
        .unwrap();

    transport.send(&builder.free_cursor_in(session.cursor())).unwrap();
    session.free_cursor();
    transport.send(&builder.disconnect()).unwrap();
    session.reset();

    let codes: Vec<u32> = transport
        .sent
        .iter()
        .map(|m| Header::decode(m).unwrap().msg)
        .collect();
    assert_eq!(codes, vec![0xC8, 0xCA, 0xD0, 0xCC, 0xCB, 0xC9]);

    // The checksum allow-list held across the exchange.
    for msg in &transport.sent {
        let header = Header::decode(msg).unwrap();
        let expected = match MessageType::from_code(header.msg) {
            Some(ty) if ty.requires_checksum() => checksum(ty, &msg[HEADER_SIZE..]),
            _ => 0,
        };
        assert_eq!(header.checksum, expected, "message 0x{:X}", header.msg);
    }

    assert_eq!(session.cursor(), 0);
    assert!(session.bindings().is_empty());
}

#[test]
fn test_set_bindings_accepts_width_smaller_than_layout() {
    let builder = builder();
    let bindings = builder.bindings_from_config().unwrap();
    assert_eq!(bindings[1].vtype, VType::Lpwstr);

    // Bound offsets reach byte 30; declaring 8 must still encode.
    let framed = builder.set_bindings_in(7, 8, &bindings).unwrap();
    let p = &framed[HEADER_SIZE..];
    assert_eq!(u32_at(p, 4), 8, "declared width is not clamped");
}

#[test]
fn test_seek_modes_change_request_length() {
    let builder = builder();
    let next = builder
        .get_rows_in(7, 3, 72, 16384, 0, false, SeekDescription::Next { skip: 0 })
        .unwrap();
    let at = builder
        .get_rows_in(
            7,
            3,
            72,
            16384,
            0,
            false,
            SeekDescription::At {
                bookmark: 2,
                skip: 2,
                region: 0,
            },
        )
        .unwrap();
    assert_eq!(at.len(), next.len() + 8, "bookmark seek carries 8 more bytes");
    assert_eq!(u32_at(&at[HEADER_SIZE..], 32), 2, "seek mode");
    assert_eq!(u32_at(&at[HEADER_SIZE..], 12), 12, "seek description size");
}
