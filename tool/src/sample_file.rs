use std::fs;
use std::path::Path;

use anyhow::Context;

/// Longest capture a single track file may contribute.
pub const MAX_SAMPLES: usize = 200_000;

/// Parse whitespace separated decimal tick counts. Reading stops at the first
/// token that is not an unsigned integer; samples beyond [`MAX_SAMPLES`] are
/// silently ignored.
pub fn parse_samples(text: &str) -> Vec<u32> {
    let mut samples = Vec::new();

    for token in text.split_whitespace() {
        let Ok(value) = token.parse::<u32>() else {
            break;
        };
        samples.push(value);
        if samples.len() == MAX_SAMPLES {
            break;
        }
    }
    samples
}

pub fn load(path: &Path) -> anyhow::Result<Vec<u32>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Unable to read track file {}", path.display()))?;
    Ok(parse_samples(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whitespace_separated_ticks() {
        assert_eq!(parse_samples("75 150\n112\t75\n"), vec![75, 150, 112, 75]);
        assert_eq!(parse_samples(""), Vec::<u32>::new());
    }

    #[test]
    fn stops_at_first_non_integer_token() {
        assert_eq!(parse_samples("75 150 end 112"), vec![75, 150]);
        assert_eq!(parse_samples("-5 75"), Vec::<u32>::new());
    }

    #[test]
    fn caps_at_max_samples() {
        let text = "75 ".repeat(MAX_SAMPLES + 100);
        assert_eq!(parse_samples(&text).len(), MAX_SAMPLES);
    }
}
