use super::{GridProjection, HotPage, page_index};
use fnv::FnvHashMap;

/// Access count per page index.
///
/// Every key has a count of at least one, and the counts sum to the number of
/// addresses recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTable {
    counts: FnvHashMap<u64, u64>,
    total: u64,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_addresses<I>(addrs: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut table = Self::new();
        for addr in addrs {
            table.record(addr);
        }
        table
    }

    /// Count one access to the page containing `addr`
    pub fn record(&mut self, addr: u64) {
        self.record_page(page_index(addr));
    }

    pub fn record_page(&mut self, page: u64) {
        *self.counts.entry(page).or_insert(0) += 1;
        self.total += 1;
    }

    /// Add the counts of `other` into this table
    pub fn merge(&mut self, other: &PageTable) {
        for (&page, &count) in &other.counts {
            *self.counts.entry(page).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn get(&self, page: u64) -> Option<u64> {
        self.counts.get(&page).copied()
    }

    /// Number of distinct pages
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.total
    }

    /// `(page, count)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.counts.iter().map(|(&p, &c)| (p, c))
    }

    pub fn grid(&self) -> GridProjection {
        GridProjection::from_table(self)
    }

    /// The `n` hottest pages, descending by count, lower page index first on ties
    pub fn ranked(&self, n: usize) -> Vec<HotPage> {
        let mut pages: Vec<HotPage> = self
            .iter()
            .map(|(page, count)| HotPage { page, count })
            .collect();
        pages.sort_unstable_by(|a, b| b.count.cmp(&a.count).then(a.page.cmp(&b.page)));
        pages.truncate(n);
        pages
    }
}

impl FromIterator<u64> for PageTable {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self::from_addresses(iter)
    }
}
