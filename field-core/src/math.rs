//! Float helpers that fall back to `libm` without `std`.

pub(crate) fn sqrt(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrtf(value)
    }
}

pub(crate) fn floor(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.floor()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::floorf(value)
    }
}

pub(crate) fn ceil(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.ceil()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::ceilf(value)
    }
}

pub(crate) fn round(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.round()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::roundf(value)
    }
}

pub(crate) fn sin_cos(angle: f32) -> (f32, f32) {
    #[cfg(feature = "std")]
    {
        angle.sin_cos()
    }
    #[cfg(not(feature = "std"))]
    {
        (libm::sinf(angle), libm::cosf(angle))
    }
}
