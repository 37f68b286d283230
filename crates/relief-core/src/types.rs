/// A census year, as discovered from the census table header.
pub type Year = u16;

/// A non-negative population count.
pub type Population = u64;
