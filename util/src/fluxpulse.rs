use crate::Bit;
use crate::PulseDuration;

/// Turns a stream of bit cells into flux pulse durations. Every cell adds one
/// cell time to the accumulator; a set cell emits the accumulated duration
/// and starts the next pulse.
pub struct FluxPulseGenerator<T>
where
    T: FnMut(PulseDuration),
{
    sink: T,
    pub cell_duration: u32,
    accumulator: u32,
}

impl<T> FluxPulseGenerator<T>
where
    T: FnMut(PulseDuration),
{
    pub fn new(sink: T, cell_duration: u32) -> FluxPulseGenerator<T> {
        FluxPulseGenerator {
            sink,
            cell_duration,
            accumulator: 0,
        }
    }

    pub fn feed(&mut self, cell: Bit) {
        self.accumulator += self.cell_duration;

        if cell.0 {
            (self.sink)(PulseDuration(self.accumulator));
            self.accumulator = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_to_pulses_test() {
        let v1: Vec<u8> = vec![1, 0, 0, 1, 0, 1, 1, 0, 0, 0, 0, 1];
        let mut result: Vec<PulseDuration> = Vec::new();
        let mut pulse_generator = FluxPulseGenerator::new(|f| result.push(f), 100);
        v1.into_iter()
            .for_each(|cell| pulse_generator.feed(Bit(cell == 1)));

        assert_eq!(
            result,
            vec![
                PulseDuration(100),
                PulseDuration(300),
                PulseDuration(200),
                PulseDuration(100),
                PulseDuration(500)
            ]
        );
    }
}
