use super::page_base;
use serde::Serialize;

/// One entry of the hot-page ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotPage {
    pub page: u64,
    pub count: u64,
}

impl HotPage {
    pub fn base_address(&self) -> u64 {
        page_base(self.page)
    }

    /// Base address as a fixed-width 40-bit hex string, e.g. `0x0000001000`
    pub fn label(&self) -> String {
        format!("0x{:010x}", self.base_address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_padded_base_address() {
        assert_eq!(HotPage { page: 1, count: 2 }.label(), "0x0000001000");
        assert_eq!(
            HotPage {
                page: (1 << 28) - 1,
                count: 1
            }
            .label(),
            "0xfffffff000"
        );
    }
}
