//! Fill command implementation

use anyhow::{Context, Result};
use nativemem::{Buffer, DirectBuffer, memory};

use crate::utils::hex_dump;

pub fn run(size: usize, value: u8, offset: usize, len: Option<usize>) -> Result<()> {
    let len = resolve_range(size, offset, len)?;

    let mut buffer = DirectBuffer::allocate(size).context("allocating direct buffer")?;
    for i in 0..buffer.capacity() {
        buffer.put(i, i as u8);
    }

    let address = memory::address_of(&buffer)?;
    println!("Buffer at {address}, {size} bytes, {}", buffer.order());
    println!("Before:");
    print!("{}", hex_dump(buffer.as_bytes()));

    // The range lies inside `buffer`, which outlives the call.
    unsafe { memory::fill(address + offset, value, len)? };

    println!("After filling {len} bytes at +{offset} with {value:#04x}:");
    print!("{}", hex_dump(buffer.as_bytes()));
    Ok(())
}

/// Length of the fill range, defaulting to everything from `offset` to the end.
fn resolve_range(size: usize, offset: usize, len: Option<usize>) -> Result<usize> {
    let Some(available) = size.checked_sub(offset) else {
        anyhow::bail!("offset {offset} is past the end of a {size}-byte buffer");
    };
    let len = len.unwrap_or(available);
    if len > available {
        anyhow::bail!("{len} bytes at offset {offset} exceed buffer size {size}");
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(64, 0, None).unwrap(), 64);
        assert_eq!(resolve_range(64, 16, None).unwrap(), 48);
        assert_eq!(resolve_range(64, 16, Some(48)).unwrap(), 48);
        assert_eq!(resolve_range(64, 64, None).unwrap(), 0);
        assert!(resolve_range(64, 65, None).is_err());
        assert!(resolve_range(64, 16, Some(49)).is_err());
    }

    #[test]
    fn test_resolve_range_huge_len() {
        let err = resolve_range(64, 8, Some(usize::MAX)).unwrap_err();
        assert!(err.to_string().contains("exceed buffer size 64"));
        assert!(resolve_range(64, usize::MAX, Some(usize::MAX)).is_err());
    }
}
