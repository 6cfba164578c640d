use quire_core::config::CompressionStrategy;

/// Parse compression strategy from string
pub fn parse_strategy(s: &str) -> std::result::Result<CompressionStrategy, String> {
    s.parse::<CompressionStrategy>().map_err(|e| e.to_string())
}
