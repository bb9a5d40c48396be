use crate::config::Environment;
use crate::domain::identity::IdentityType;

/// Everything that differs between card network SDKs.
///
/// Plain data: no adapter carries behaviour of its own, they all run through
/// [`crate::application::initiator::SchemeInitiator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeDescriptor {
    pub scheme: &'static str,
    pub test_url: &'static str,
    pub live_url: &'static str,
    /// Name under which the SDK publishes itself on the global namespace.
    pub global_binding: &'static str,
    /// Canonical identity type to the network's own tag.
    pub identity_types: &'static [(IdentityType, &'static str)],
}

impl SchemeDescriptor {
    pub fn sdk_url(&self, environment: Environment) -> &'static str {
        match environment {
            Environment::Test => self.test_url,
            Environment::Live => self.live_url,
        }
    }

    pub fn identity_tag(&self, identity_type: IdentityType) -> Option<&'static str> {
        self.identity_types
            .iter()
            .find(|(canonical, _)| *canonical == identity_type)
            .map(|(_, tag)| *tag)
    }
}

pub const MASTERCARD: SchemeDescriptor = SchemeDescriptor {
    scheme: "mc",
    test_url: "https://sandbox.src.mastercard.com/sdk/srcsdk.mastercard.js",
    live_url: "https://src.mastercard.com/sdk/srcsdk.mastercard.js",
    global_binding: "SRCSDK_MASTERCARD",
    identity_types: &[
        (IdentityType::Email, "EMAIL_ADDRESS"),
        (IdentityType::MobilePhone, "MOBILE_PHONE_NUMBER"),
    ],
};

pub const VISA: SchemeDescriptor = SchemeDescriptor {
    scheme: "visa",
    test_url: "https://sandbox-assets.secure.checkout.visa.com/checkout-widget/resources/js/src-i-adapter/visaSdk.js",
    live_url: "https://assets.secure.checkout.visa.com/checkout-widget/resources/js/src-i-adapter/visaSdk.js",
    global_binding: "vAdapters.VisaSRCI",
    identity_types: &[
        (IdentityType::Email, "EMAIL"),
        (IdentityType::MobilePhone, "MOBILE_NUMBER"),
    ],
};

pub const SUPPORTED_SCHEMES: [SchemeDescriptor; 2] = [MASTERCARD, VISA];

/// Looks up a supported network by its identifier (`"mc"`, `"visa"`).
pub fn descriptor_for(scheme: &str) -> Option<SchemeDescriptor> {
    SUPPORTED_SCHEMES
        .iter()
        .find(|descriptor| descriptor.scheme == scheme)
        .copied()
}
