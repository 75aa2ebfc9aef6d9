/// Touch and confirmation flags of a form.
///
/// Each pair is complementary; build it with [`compute_metadata`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Metadata {
    pub touched: bool,
    pub untouched: bool,
    pub confirmed: bool,
    pub unconfirmed: bool,
}

impl Default for Metadata {
    fn default() -> Self {
        compute_metadata(false, false)
    }
}

pub const fn compute_metadata(touched: bool, confirmed: bool) -> Metadata {
    Metadata {
        touched,
        untouched: !touched,
        confirmed,
        unconfirmed: !confirmed,
    }
}

impl Metadata {
    pub const fn touch(self) -> Self {
        compute_metadata(true, self.confirmed)
    }

    pub const fn confirm(self) -> Self {
        compute_metadata(self.touched, true)
    }

    /// Whether validation errors should be shown to the user.
    pub const fn reveals_errors(self) -> bool {
        self.touched || self.confirmed
    }
}
