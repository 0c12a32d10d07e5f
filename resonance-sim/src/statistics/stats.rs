/// Running average of `v^power` over the recorded samples.
#[derive(Clone, Debug)]
pub struct Statistics {
    pub count: usize,
    pub aggregate: f64,
    pub power: u32,
}

impl Statistics {
    pub fn new(power: u32) -> Self {
        Self {
            count: 0,
            aggregate: 0.0,
            power,
        }
    }

    pub fn update(&mut self, value: f64) {
        self.count += 1;
        self.aggregate += if self.power == 1 {
            value
        } else {
            value.powi(self.power as i32)
        };
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return self.aggregate;
        }
        self.aggregate / self.count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let mut first = Statistics::new(1);
        let mut second = Statistics::new(2);
        for v in [1.0, -2.0, 3.0] {
            first.update(v);
            second.update(v);
        }
        assert_eq!(first.average(), 2.0 / 3.0);
        assert_eq!(second.average(), 14.0 / 3.0);
        assert_eq!(Statistics::new(1).average(), 0.0);
    }
}
