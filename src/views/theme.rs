// src/views/theme.rs

// Paleta do dashboard (tons de café)
pub struct Theme {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub accent: [&'static str; 5],
}

pub static THEME: Theme = Theme {
    primary: "#3E2723",    // marrom escuro
    secondary: "#8D6E63",  // marrom claro
    background: "#EFEBE9", // bege claro
    accent: ["#795548", "#A1887F", "#BCAAA4", "#D7CCC8", "#EFEBE9"],
};

impl Theme {
    /// Cor de destaque do índice `i`, em ciclo.
    pub fn accent_at(&self, i: usize) -> &'static str {
        self.accent[i % self.accent.len()]
    }
}

/// "#3E2723" -> (0x3E, 0x27, 0x23). Texto inválido vira preto.
pub fn hex_channels(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .unwrap_or(0)
    };
    (channel(0..2), channel(2..4), channel(4..6))
}

pub const CURRENCY_SYMBOL: &str = "฿";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_hex_becomes_channels() {
        assert_eq!(hex_channels(THEME.primary), (0x3E, 0x27, 0x23));
        assert_eq!(hex_channels("#zz"), (0, 0, 0));
    }
}
