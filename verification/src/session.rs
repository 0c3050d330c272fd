//! Identity values carried across the Identify → VerifySMS transition.

use std::cell::RefCell;

use agora_types::{NationalId, Phone};

/// Session-scoped identity context.
///
/// Created when a workflow starts, filled when Identify input validates,
/// read by SMS verification, and cleared when the workflow completes or is
/// abandoned. Values never leave the client except inside the next
/// submission.
#[derive(Debug, Default)]
pub struct SessionContext {
    phone: RefCell<Option<Phone>>,
    national_id: RefCell<Option<NationalId>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&self, phone: Phone, national_id: NationalId) {
        *self.phone.borrow_mut() = Some(phone);
        *self.national_id.borrow_mut() = Some(national_id);
    }

    pub fn phone(&self) -> Option<Phone> {
        self.phone.borrow().clone()
    }

    pub fn national_id(&self) -> Option<NationalId> {
        self.national_id.borrow().clone()
    }

    pub fn clear(&self) {
        self.phone.borrow_mut().take();
        self.national_id.borrow_mut().take();
    }

    pub fn is_empty(&self) -> bool {
        self.phone.borrow().is_none() && self.national_id.borrow().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_then_clear() {
        let session = SessionContext::new();
        assert!(session.is_empty());

        session.remember(
            Phone::from_normalized("+34666666666").unwrap(),
            NationalId::parse("12345678Z").unwrap(),
        );
        assert_eq!(session.phone().unwrap().as_str(), "+34666666666");
        assert_eq!(session.national_id().unwrap().as_str(), "12345678Z");

        session.clear();
        assert!(session.is_empty());
    }
}
