// Statistical primitives used for cardinality estimation of filtered
// domains. The Beta posterior tracks the acceptance rate of a filter
// predicate; the Beta-Binomial variant is its discrete analogue for domains
// whose base population is exactly known.

/// A continuous probability distribution.
pub trait Distribution {
    fn mean(&self) -> f64;
    fn mode(&self) -> f64;
    fn pdf(&self, x: f64) -> f64;
    fn cdf(&self, x: f64) -> f64;
    /// Inverse CDF (quantile function).
    fn inv(&self, p: f64) -> f64;
}

/// A discrete distribution whose support is a contiguous set of integers.
/// Default implementations are O(n) on the support size.
pub trait IntegerDistribution {
    fn support_min(&self) -> i64;
    fn support_max(&self) -> i64;
    fn pdf(&self, k: i64) -> f64;

    fn mean(&self) -> f64 {
        (self.support_min()..=self.support_max())
            .map(|k| k as f64 * self.pdf(k))
            .sum()
    }

    fn mode(&self) -> i64 {
        let mut best = self.support_min();
        let mut best_p = -1.0;
        for k in self.support_min()..=self.support_max() {
            let p = self.pdf(k);
            if p > best_p {
                best = k;
                best_p = p;
            }
        }
        best
    }

    fn cdf(&self, k: i64) -> f64 {
        if k < self.support_min() {
            return 0.0;
        }
        if k >= self.support_max() {
            return 1.0;
        }
        (self.support_min()..=k).map(|j| self.pdf(j)).sum()
    }

    /// Binary search for the smallest k with cdf(k) >= p.
    fn inv(&self, p: f64) -> i64 {
        let mut low = self.support_min();
        let mut high = self.support_max();
        while low < high {
            let mid = low + (high - low) / 2;
            if self.cdf(mid) >= p {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        low
    }
}

/// Beta distribution over [0, 1], updated online from accept/reject counts.
#[derive(Debug, Clone)]
pub struct BetaDistribution {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaDistribution {
    pub fn new(alpha: f64, beta: f64) -> BetaDistribution {
        BetaDistribution { alpha, beta }
    }

    /// Record `successes` accepted and `failures` rejected observations.
    pub fn update(&mut self, successes: f64, failures: f64) {
        self.alpha += successes;
        self.beta += failures;
    }
}

impl Distribution for BetaDistribution {
    fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    fn mode(&self) -> f64 {
        if self.alpha <= 1.0 && self.beta <= 1.0 {
            0.5
        } else if self.alpha <= 1.0 {
            0.0
        } else if self.beta <= 1.0 {
            1.0
        } else {
            (self.alpha - 1.0) / (self.alpha + self.beta - 2.0)
        }
    }

    fn pdf(&self, x: f64) -> f64 {
        if !(0.0..=1.0).contains(&x) {
            return 0.0;
        }
        let ln = (self.alpha - 1.0) * x.ln() + (self.beta - 1.0) * (1.0 - x).ln()
            + ln_gamma(self.alpha + self.beta)
            - ln_gamma(self.alpha)
            - ln_gamma(self.beta);
        ln.exp()
    }

    fn cdf(&self, x: f64) -> f64 {
        incomplete_beta(self.alpha, self.beta, x)
    }

    fn inv(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        if p >= 1.0 {
            return 1.0;
        }
        let mut low = 0.0;
        let mut high = 1.0;
        for _ in 0..64 {
            let mid = (low + high) / 2.0;
            if self.cdf(mid) >= p {
                high = mid;
            } else {
                low = mid;
            }
        }
        (low + high) / 2.0
    }
}

/// Beta-Binomial distribution over 0..=trials.
#[derive(Debug, Clone)]
pub struct BetaBinomialDistribution {
    pub trials: i64,
    pub alpha: f64,
    pub beta: f64,
}

impl BetaBinomialDistribution {
    pub fn new(trials: i64, alpha: f64, beta: f64) -> BetaBinomialDistribution {
        BetaBinomialDistribution { trials, alpha, beta }
    }

    fn log_pdf(&self, k: i64) -> f64 {
        let n = self.trials as f64;
        let x = k as f64;
        ln_combinations(n, x) + ln_beta(x + self.alpha, n - x + self.beta)
            - ln_beta(self.alpha, self.beta)
    }
}

impl IntegerDistribution for BetaBinomialDistribution {
    fn support_min(&self) -> i64 {
        0
    }

    fn support_max(&self) -> i64 {
        self.trials
    }

    fn pdf(&self, k: i64) -> f64 {
        if k < 0 || k > self.trials {
            return 0.0;
        }
        self.log_pdf(k).exp()
    }

    fn mean(&self) -> f64 {
        self.trials as f64 * self.alpha / (self.alpha + self.beta)
    }

    fn mode(&self) -> i64 {
        if self.alpha <= 1.0 || self.beta <= 1.0 {
            return if self.beta >= self.alpha { 0 } else { self.trials };
        }
        // Approximation, exact only in the unimodal interior case.
        (self.trials as f64 * (self.alpha - 1.0) / (self.alpha + self.beta - 2.0)).round() as i64
    }
}

/// Natural log of the gamma function (Lanczos approximation, g = 7).
pub fn ln_gamma(z: f64) -> f64 {
    const COF: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if z < 0.5 {
        // Reflection formula.
        let pi = std::f64::consts::PI;
        return pi.ln() - (pi * z).sin().ln() - ln_gamma(1.0 - z);
    }
    let z = z - 1.0;
    let mut x = COF[0];
    for (i, c) in COF.iter().enumerate().skip(1) {
        x += c / (z + i as f64);
    }
    let t = z + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (z + 0.5) * t.ln() - t + x.ln()
}

pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

fn ln_combinations(n: f64, k: f64) -> f64 {
    ln_gamma(n + 1.0) - ln_gamma(k + 1.0) - ln_gamma(n - k + 1.0)
}

pub fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, i| acc * i as f64)
}

/// Binomial coefficient C(n, k) as a float; domains can be large enough that
/// exact integer arithmetic would overflow.
pub fn combinations(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut acc = 1.0;
    for i in 0..k {
        acc = acc * (n - i) as f64 / (i + 1) as f64;
    }
    acc
}

/// Regularized incomplete beta function I_x(a, b), computed with the
/// continued-fraction expansion.
pub fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_cf(a, b, x) / a
    } else {
        1.0 - front * beta_cf(b, a, 1.0 - x) / b
    }
}

fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    const FPMIN: f64 = 1e-300;
    const EPS: f64 = 3e-12;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;
    for m in 1..=200 {
        let m = m as f64;
        let m2 = 2.0 * m;
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}
