//! End-to-end tests: configuration text in, patched image out

use vlanpatch_core::config::parse_config;
use vlanpatch_core::encoder::decode;
use vlanpatch_core::image::{DataOffset, Image, HEADER_MAGIC, LATE_DATA_OFFSET, MARKER, MARKER_OFFSET};
use vlanpatch_core::op::{OperationLog, Width};
use vlanpatch_core::{regs, vlan, Error, FormatError};

const IMAGE_SIZE: usize = 0x8000;
const EXISTING_ENTRIES: u16 = 6;

/// Firmware-like image: marker set, write table with a few existing words
fn firmware_image() -> Vec<u8> {
    let mut data = vec![0xFF; IMAGE_SIZE];
    data[MARKER_OFFSET] = MARKER;

    let header = (HEADER_MAGIC << 11) | (1 << 10) | EXISTING_ENTRIES;
    data[LATE_DATA_OFFSET..LATE_DATA_OFFSET + 2].copy_from_slice(&header.to_le_bytes());

    let table: [u8; 12] = [
        0x01, 0xff, 0x00, 0x00, // page 0
        0x01, 0x0b, 0x02, 0x00, // switch mode
        0x01, 0x20, 0x01, 0x00, // misc
    ];
    data[LATE_DATA_OFFSET + 2..LATE_DATA_OFFSET + 2 + table.len()].copy_from_slice(&table);
    data
}

fn patched_table(out: &[u8], entries: u16) -> &[u8] {
    let start = LATE_DATA_OFFSET + 2;
    &out[start..start + usize::from(entries) * 2]
}

#[test]
fn vlan_scenario() {
    let topo = parse_config("1: 10\n2: 10t 20t\n").unwrap();

    let mut img = Image::load(firmware_image()).unwrap();
    assert_eq!(img.offset_source(), DataOffset::Marker);
    vlan::program(img.ops_mut(), &topo);

    let out = img.save().unwrap();
    let header = u16::from_le_bytes([out[LATE_DATA_OFFSET], out[LATE_DATA_OFFSET + 1]]);
    assert_eq!(header >> 11, HEADER_MAGIC);
    assert_eq!((header >> 10) & 1, 1);

    let entries = header & 0x3FF;
    let ops = decode(patched_table(&out, entries)).unwrap();

    // Existing records come first and are preserved
    assert_eq!(ops[0].addr, 0x0b);
    assert_eq!(ops[0].value, 0x02);
    let new_ops = &ops[2..];
    assert_eq!(new_ops.len(), img.ops().len());

    let find = |reg: regs::Register| -> Vec<u64> {
        new_ops
            .iter()
            .filter(|op| op.page == reg.page && op.addr == reg.addr)
            .map(|op| op.value)
            .collect()
    };

    assert_eq!(find(regs::DEFAULT_TAG), [10]);
    assert_eq!(find(regs::DEFAULT_TAG.offset(2)), Vec::<u64>::new());
    let blocked = find(regs::VLAN_CONTROL3);
    assert_eq!(blocked.len(), 1);
    assert_ne!(blocked[0] & 0b10, 0);
    assert_eq!(blocked[0] & 0b01, 0);
    assert_eq!(find(regs::VLAN_TABLE_INDEX), [10, 20]);
    assert_eq!(find(regs::VLAN_TABLE_ENTRY), [(0b01 << 9) | 0b11, 0b10]);
    assert_eq!(find(regs::VLAN_TABLE_CONTROL), [0x80, 0x80]);
}

#[test]
fn encoded_length_matches_entries() {
    let topo = parse_config("1: 1\n2: 1\n3: 2 1t\n8: 4094t\n").unwrap();
    let mut log = OperationLog::new();
    vlan::program(&mut log, &topo);

    let mut img = Image::load(firmware_image()).unwrap();
    *img.ops_mut() = log.clone();
    let out = img.save().unwrap();

    let encoded = vlanpatch_core::encoder::encode(&log);
    assert_eq!(encoded.len() % 2, 0);
    let header = u16::from_le_bytes([out[LATE_DATA_OFFSET], out[LATE_DATA_OFFSET + 1]]);
    assert_eq!(
        usize::from(header & 0x3FF),
        usize::from(EXISTING_ENTRIES) + encoded.len() / 2
    );

    let start = LATE_DATA_OFFSET + 2 + usize::from(EXISTING_ENTRIES) * 2;
    assert_eq!(&out[start..start + encoded.len()], &encoded[..]);
}

#[test]
fn decoded_widths_follow_registers() {
    let topo = parse_config("4: 100 200t\n").unwrap();
    let mut img = Image::load(firmware_image()).unwrap();
    vlan::program(img.ops_mut(), &topo);

    let out = img.save().unwrap();
    let header = u16::from_le_bytes([out[LATE_DATA_OFFSET], out[LATE_DATA_OFFSET + 1]]);
    let ops = decode(patched_table(&out, header & 0x3FF)).unwrap();

    let entry = ops
        .iter()
        .find(|op| op.page == regs::VLAN_TABLE_ENTRY.page && op.addr == regs::VLAN_TABLE_ENTRY.addr)
        .unwrap();
    assert_eq!(entry.width, Width::Bits32);

    let jumbo = ops
        .iter()
        .find(|op| op.page == regs::JUMBO_PORT_MASK.page && op.addr == regs::JUMBO_PORT_MASK.addr)
        .unwrap();
    assert_eq!(jumbo.width, Width::Bits32);
    assert_eq!(jumbo.value, 0);
}

#[test]
fn clear_then_save_is_noop() {
    let original = firmware_image();
    let untouched = Image::load(original.clone()).unwrap().save().unwrap();

    let mut img = Image::load(original).unwrap();
    vlan::program(img.ops_mut(), &parse_config("1: 10\n").unwrap());
    img.clear();
    assert_eq!(img.save().unwrap(), untouched);
}

#[test]
fn file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.img");
    let config = dir.path().join("vlan.cfg");
    let output = dir.path().join("output.img");

    std::fs::write(&input, firmware_image()).unwrap();
    std::fs::write(&config, "# test\n1: 10\n2: 10t\n").unwrap();

    let topo = vlanpatch_core::config::parse_config_file(&config).unwrap();
    let mut img = Image::from_file(&input).unwrap();
    vlan::program(img.ops_mut(), &topo);
    img.save_to_file(&output).unwrap();

    let written = std::fs::read(&output).unwrap();
    assert_eq!(written, img.save().unwrap());

    let reloaded = Image::from_file(&output).unwrap();
    assert_eq!(
        usize::from(reloaded.entries()),
        usize::from(EXISTING_ENTRIES) + vlanpatch_core::encoder::encode(img.ops()).len() / 2
    );
    assert!(reloaded.speed_mode());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Image::from_file(dir.path().join("missing.img")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn image_too_small_for_patch() {
    // Table ends right at the end of the image
    let mut data = vec![0u8; 0x200];
    let header = (HEADER_MAGIC << 11) | 0xFF;
    data[0..2].copy_from_slice(&header.to_le_bytes());

    let mut img = Image::load(data).unwrap();
    assert_eq!(img.offset_source(), DataOffset::Fallback);
    vlan::program(img.ops_mut(), &parse_config("1: 10\n").unwrap());
    assert!(matches!(
        img.save(),
        Err(FormatError::TruncatedImage { .. })
    ));
}
