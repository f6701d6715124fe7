//! [`Case`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xxhash_rust::xxh3;

use crate::domain::{user, Offer, Selection, Showing};

/// Property listing undergoing the broker-selection process.
#[derive(Clone, Debug)]
pub struct Case {
    /// ID of this [`Case`].
    pub id: Id,

    /// Human-facing [`Number`] of this [`Case`].
    pub number: Number,

    /// [`Hash`] of this [`Case`] used for deduplication.
    ///
    /// [`Hash`]: struct@Hash
    pub hash: Hash,

    /// ID of the [`User`] who owns this [`Case`].
    ///
    /// [`User`]: crate::domain::User
    pub seller_id: user::Id,

    /// [`Address`] of the property.
    pub address: Address,

    /// [`PostalCode`] of the property.
    pub postal_code: PostalCode,

    /// [`Municipality`] the property is located in.
    pub municipality: Municipality,

    /// [`Kind`] of the property.
    pub kind: Kind,

    /// Living area of the property in square meters.
    pub size_sqm: SizeSqm,

    /// Number of rooms in the property.
    pub num_rooms: NumRooms,

    /// Year the property was constructed.
    pub construction_year: ConstructionYear,

    /// [`EnergyLabel`] of the property.
    pub energy_label: EnergyLabel,

    /// Price the seller expects for the property.
    pub expected_price: Money,

    /// Reference value of the property provided by a valuation estimator.
    ///
    /// [`None`] means no comparison is available.
    pub reference_value: Option<Money>,

    /// Free-text [`Notes`] with the seller's priorities.
    pub notes: Option<Notes>,

    /// Terminal [`ManualStatus`] override of this [`Case`], if any.
    ///
    /// This is the only lifecycle information stored on the record itself:
    /// everything else is derived by [`Case::status()`].
    pub manual_status: Option<ManualStatus>,

    /// [`DateTime`] when this [`Case`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Case`] was submitted to agents.
    ///
    /// [`None`] means the [`Case`] is still a draft.
    pub submitted_at: Option<SubmissionDateTime>,

    /// [`DateTime`] when the broker-selection process of this [`Case`] was
    /// completed.
    pub completed_at: Option<CompletionDateTime>,
}

impl Case {
    /// Resolves the current [`Status`] of this [`Case`] from its child
    /// collections.
    ///
    /// The stored record never carries a trusted lifecycle status: every read
    /// re-derives it from the [`Showing`], the [`Offer`]s and the
    /// [`Selection`], so concurrent writers converge without a lock. The only
    /// stored input is the terminal [`ManualStatus`] override, which always
    /// wins.
    #[must_use]
    pub fn status(
        &self,
        showing: Option<&Showing>,
        offers: &[Offer],
        selection: Option<&Selection>,
    ) -> Status {
        use Status as S;

        if let Some(terminal) = self.manual_status {
            return terminal.into();
        }

        if selection.is_some() {
            return if self.completed_at.is_some() {
                S::Completed
            } else {
                S::BrokerSelected
            };
        }

        if !offers.is_empty() {
            return S::OffersReceived;
        }

        if let Some(showing) = showing {
            if showing.completed_at.is_some() {
                return S::ShowingCompleted;
            }
            if showing.scheduled_at.is_some() {
                return S::ShowingScheduled;
            }
        }

        if self.submitted_at.is_some() {
            return S::Active;
        }

        S::Draft
    }

    /// Returns whether this [`Case`] has reached a terminal status on the
    /// record itself, without consulting its child collections.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.manual_status.is_some() || self.completed_at.is_some()
    }
}

/// ID of a [`Case`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Human-facing number of a [`Case`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[display("S-{_0:06}")]
pub struct Number(u32);

/// Hash of a [`Case`] used for deduplication of property listings.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Hash(Uuid);

impl Hash {
    /// Calculates a new [`Hash`] for a [`Case`].
    ///
    /// [`Hash`]: struct@Hash
    #[must_use]
    pub fn new(address: &Address, postal_code: &PostalCode) -> Self {
        use std::hash::Hash as _;

        // WARNING: Avoid changing the order of the fields in the hasher,
        //          because it will be a breaking change requiring to migrate
        //          all existing hashes in the store to the new format.
        let mut hasher = xxh3::Xxh3Builder::new().build();
        address.hash(&mut hasher);
        postal_code.hash(&mut hasher);

        Self(Uuid::from_u128(hasher.digest128()))
    }
}

/// Street address of a [`Case`]'s property.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address && !address.is_empty() && address.len() <= 512
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// Postal code of a [`Case`]'s property.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct PostalCode(String);

impl PostalCode {
    /// Creates a new [`PostalCode`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `code` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Creates a new [`PostalCode`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`PostalCode`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        code.len() == 4 && code.chars().all(|c| c.is_ascii_digit())
    }
}

impl FromStr for PostalCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PostalCode`")
    }
}

/// Municipality a [`Case`]'s property is located in.
#[derive(
    AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[as_ref(forward)]
pub struct Municipality(String);

impl Municipality {
    /// Creates a new [`Municipality`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Municipality`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Municipality`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Municipality {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Municipality`")
    }
}

/// Free-text notes of a [`Case`]'s seller.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(forward)]
pub struct Notes(String);

impl Notes {
    /// Creates a new [`Notes`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `notes` match the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }

    /// Creates a new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        !notes.is_empty() && notes.len() <= 2048
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// Living area of a [`Case`]'s property in square meters.
pub type SizeSqm = u16;

/// Number of rooms in a [`Case`]'s property.
pub type NumRooms = u8;

/// Year a [`Case`]'s property was constructed.
pub type ConstructionYear = u16;

define_kind! {
    #[doc = "Kind of a [`Case`]'s property."]
    enum Kind {
        #[doc = "A detached house."]
        Villa = 1,

        #[doc = "An apartment in a building."]
        Apartment = 2,

        #[doc = "A townhouse sharing walls with its neighbors."]
        Townhouse = 3,

        #[doc = "A holiday home."]
        HolidayHome = 4,

        #[doc = "A farm property."]
        Farm = 5,
    }
}

define_kind! {
    #[doc = "Energy label of a [`Case`]'s property."]
    enum EnergyLabel {
        #[doc = "Label A."]
        A = 1,

        #[doc = "Label B."]
        B = 2,

        #[doc = "Label C."]
        C = 3,

        #[doc = "Label D."]
        D = 4,

        #[doc = "Label E."]
        E = 5,

        #[doc = "Label F."]
        F = 6,

        #[doc = "Label G."]
        G = 7,
    }
}

define_kind! {
    #[doc = "Lifecycle status of a [`Case`], derived by [`Case::status()`]."]
    enum Status {
        #[doc = "The seller is still editing the [`Case`]."]
        Draft = 1,

        #[doc = "The [`Case`] is visible to agents."]
        Active = 2,

        #[doc = "A showing of the property is scheduled."]
        ShowingScheduled = 3,

        #[doc = "The showing took place, offers may be submitted."]
        ShowingCompleted = 4,

        #[doc = "At least one offer is present."]
        OffersReceived = 5,

        #[doc = "The seller has selected a winning offer."]
        BrokerSelected = 6,

        #[doc = "The broker-selection process is completed."]
        Completed = 7,

        #[doc = "The seller withdrew the [`Case`]."]
        Withdrawn = 8,

        #[doc = "An administrator archived the [`Case`]."]
        Archived = 9,
    }
}

impl Status {
    /// Returns whether this [`Status`] is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Withdrawn | Self::Archived)
    }

    /// Returns whether [`Offer`]s may be submitted to a [`Case`] in this
    /// [`Status`].
    #[must_use]
    pub fn accepts_offers(self) -> bool {
        matches!(self, Self::ShowingCompleted | Self::OffersReceived)
    }

    /// Returns whether agents may register for the showing of a [`Case`] in
    /// this [`Status`].
    #[must_use]
    pub fn accepts_registrations(self) -> bool {
        matches!(self, Self::Active | Self::ShowingScheduled)
    }
}

define_kind! {
    #[doc = "Terminal status override stored on a [`Case`] record."]
    enum ManualStatus {
        #[doc = "The seller withdrew the [`Case`]."]
        Withdrawn = 1,

        #[doc = "An administrator archived the [`Case`]."]
        Archived = 2,
    }
}

impl From<ManualStatus> for Status {
    fn from(status: ManualStatus) -> Self {
        match status {
            ManualStatus::Withdrawn => Self::Withdrawn,
            ManualStatus::Archived => Self::Archived,
        }
    }
}

/// [`DateTime`] when a [`Case`] was created.
pub type CreationDateTime = DateTimeOf<(Case, unit::Creation)>;

/// [`DateTime`] when a [`Case`] was submitted to agents.
pub type SubmissionDateTime = DateTimeOf<(Case, unit::Submission)>;

/// [`DateTime`] when a [`Case`]'s broker-selection process was completed.
pub type CompletionDateTime = DateTimeOf<(Case, unit::Completion)>;

#[cfg(test)]
mod spec {
    use common::{DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{offer, user, Offer, Selection, Showing};

    use super::{Case, Hash, Id, ManualStatus, Number, Status};

    fn dkk(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: common::money::Currency::Dkk,
        }
    }

    fn case() -> Case {
        let address = super::Address::new("Strandvejen 12").unwrap();
        let postal_code = super::PostalCode::new("2900").unwrap();
        Case {
            id: Id::new(),
            number: Number::from(1),
            hash: Hash::new(&address, &postal_code),
            seller_id: user::Id::new(),
            address,
            postal_code,
            municipality: super::Municipality::new("Gentofte").unwrap(),
            kind: super::Kind::Villa,
            size_sqm: 180,
            num_rooms: 6,
            construction_year: 1968,
            energy_label: super::EnergyLabel::C,
            expected_price: dkk(3_000_000),
            reference_value: None,
            notes: None,
            manual_status: None,
            created_at: DateTime::now().coerce(),
            submitted_at: None,
            completed_at: None,
        }
    }

    fn showing(case: &Case) -> Showing {
        Showing {
            case_id: case.id,
            scheduled_at: Some(DateTime::now().coerce()),
            completed_at: None,
            roster: Vec::new(),
        }
    }

    fn offer(case: &Case) -> Offer {
        Offer {
            id: offer::Id::new(),
            case_id: case.id,
            agent_id: user::Id::new(),
            price: dkk(3_050_000),
            commission: dkk(28_000),
            binding_period: 6,
            marketing: offer::Marketing::default(),
            first_submitted_at: DateTime::now().coerce(),
            submitted_at: DateTime::now().coerce(),
            seller_viewed_at: None,
        }
    }

    fn selection(case: &Case, offer: &Offer) -> Selection {
        Selection {
            case_id: case.id,
            offer_id: offer.id,
            selected_by: case.seller_id,
            selected_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn resolves_in_priority_order() {
        let mut case = case();
        assert_eq!(case.status(None, &[], None), Status::Draft);

        case.submitted_at = Some(DateTime::now().coerce());
        assert_eq!(case.status(None, &[], None), Status::Active);

        let mut sh = showing(&case);
        assert_eq!(
            case.status(Some(&sh), &[], None),
            Status::ShowingScheduled,
        );

        sh.completed_at = Some(DateTime::now().coerce());
        assert_eq!(
            case.status(Some(&sh), &[], None),
            Status::ShowingCompleted,
        );

        let of = offer(&case);
        let offers = [of.clone()];
        assert_eq!(
            case.status(Some(&sh), &offers, None),
            Status::OffersReceived,
        );

        let sel = selection(&case, &of);
        assert_eq!(
            case.status(Some(&sh), &offers, Some(&sel)),
            Status::BrokerSelected,
        );

        case.completed_at = Some(DateTime::now().coerce());
        assert_eq!(
            case.status(Some(&sh), &offers, Some(&sel)),
            Status::Completed,
        );
    }

    #[test]
    fn is_deterministic() {
        let mut case = case();
        case.submitted_at = Some(DateTime::now().coerce());
        let sh = showing(&case);
        let offers = [offer(&case)];

        let first = case.status(Some(&sh), &offers, None);
        let second = case.status(Some(&sh), &offers, None);

        assert_eq!(first, second);
    }

    #[test]
    fn terminal_override_always_wins() {
        let mut case = case();
        case.submitted_at = Some(DateTime::now().coerce());
        case.manual_status = Some(ManualStatus::Archived);

        let mut sh = showing(&case);
        sh.completed_at = Some(DateTime::now().coerce());
        let of = offer(&case);
        let sel = selection(&case, &of);
        let offers = [of.clone()];

        // Subsequent showing/offer/selection writes cannot resurrect the
        // `Case`.
        assert_eq!(case.status(None, &[], None), Status::Archived);
        assert_eq!(
            case.status(Some(&sh), &offers, Some(&sel)),
            Status::Archived,
        );

        case.manual_status = Some(ManualStatus::Withdrawn);
        assert_eq!(
            case.status(Some(&sh), &offers, Some(&sel)),
            Status::Withdrawn,
        );
    }

    #[test]
    fn selection_pins_status_past_broker_selected() {
        let mut case = case();
        case.submitted_at = Some(DateTime::now().coerce());
        let of = offer(&case);
        let sel = selection(&case, &of);

        // Whatever the showing and offers look like, a recorded selection
        // never resolves to a pre-selection status.
        for (sh, offers) in [
            (None, Vec::new()),
            (Some(showing(&case)), Vec::new()),
            (Some(showing(&case)), vec![of.clone()]),
            (None, vec![of.clone(), offer(&case)]),
        ] {
            let status =
                case.status(sh.as_ref(), &offers, Some(&sel));
            assert_eq!(status, Status::BrokerSelected);
        }
    }
}
