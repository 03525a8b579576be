pub trait Activation: Send + Sync {
    /// Returns activation function at x
    fn call(&self, x: f64) -> f64;
    /// Returns derivative of activation function with respect to the function at x.
    /// For example, if our activation is sigmoid, then we would express the
    /// derivative as `a_x * (1-a_x)` instead of `sigmoid(a_x)(1-sigmoid(a_x))`.
    fn derivative(&self, a_x: f64) -> f64;
}

/// `1 / (1 + e^-x)`, squashing every input into (0, 1).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn call(&self, x: f64) -> f64 {
        sigmoid(x)
    }

    fn derivative(&self, a_x: f64) -> f64 {
        a_x * (1.0 - a_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn sigmoid_midpoint() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_eq!(Sigmoid.derivative(0.5), 0.25);
    }

    #[test]
    fn sigmoid_is_bounded() {
        for x in [-30.0, -5.0, -0.1, 0.0, 0.1, 5.0, 30.0] {
            let y = sigmoid(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y}");
        }
    }

    #[test]
    fn sigmoid_is_monotonic() {
        let mut last = sigmoid(-20.0);
        for step in -199..=200 {
            let y = sigmoid(step as f64 / 10.0);
            assert!(y > last);
            last = y;
        }
    }

    #[test]
    fn derivative_uses_activated_value() {
        let x = 0.8;
        let a = Sigmoid.call(x);
        let numeric = (sigmoid(x + 1e-6) - sigmoid(x - 1e-6)) / 2e-6;
        assert!(approx_eq!(f64, Sigmoid.derivative(a), numeric, epsilon = 1e-8));
    }
}
