//! Scalar float helpers that work with and without `std`.

#[cfg(feature = "std")]
mod imp {
    #[inline]
    pub fn sqrt(x: f32) -> f32 {
        x.sqrt()
    }

    #[inline]
    pub fn floor(x: f32) -> f32 {
        x.floor()
    }

    #[inline]
    pub fn ceil(x: f32) -> f32 {
        x.ceil()
    }

    #[inline]
    pub fn sin_cos(x: f32) -> (f32, f32) {
        x.sin_cos()
    }

    #[inline]
    pub fn acos(x: f32) -> f32 {
        x.acos()
    }

    #[inline]
    pub fn atan2(y: f32, x: f32) -> f32 {
        y.atan2(x)
    }

    #[inline]
    pub fn tan(x: f32) -> f32 {
        x.tan()
    }
}

#[cfg(not(feature = "std"))]
mod imp {
    #[inline]
    pub fn sqrt(x: f32) -> f32 {
        libm::sqrtf(x)
    }

    #[inline]
    pub fn floor(x: f32) -> f32 {
        libm::floorf(x)
    }

    #[inline]
    pub fn ceil(x: f32) -> f32 {
        libm::ceilf(x)
    }

    #[inline]
    pub fn sin_cos(x: f32) -> (f32, f32) {
        (libm::sinf(x), libm::cosf(x))
    }

    #[inline]
    pub fn acos(x: f32) -> f32 {
        libm::acosf(x)
    }

    #[inline]
    pub fn atan2(y: f32, x: f32) -> f32 {
        libm::atan2f(y, x)
    }

    #[inline]
    pub fn tan(x: f32) -> f32 {
        libm::tanf(x)
    }
}

pub use imp::*;
