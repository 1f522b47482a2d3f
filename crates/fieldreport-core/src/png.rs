//! PNG 헤더 파싱.
//!
//! 스크린샷 크기는 저장하지 않고 IHDR 청크에서 필요할 때 읽는다.

/// PNG 시그니처
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// IHDR 너비/높이까지 포함한 최소 헤더 길이
const HEADER_LEN: usize = 24;

/// PNG 바이트에서 (너비, 높이) 추출
///
/// 데이터가 짧거나 PNG가 아니면 `None`.
pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < HEADER_LEN || data[..8] != PNG_SIGNATURE || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

#[cfg(test)]
pub(crate) fn header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes
}
