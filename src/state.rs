use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

/// Indian states and union territories offered by the registration form, in display order.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Serialize,
    Hash,
    Eq,
    PartialEq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum State {
    #[serde(rename = "Andhra Pradesh")]
    #[strum(serialize = "Andhra Pradesh")]
    AndhraPradesh,
    #[serde(rename = "Arunachal Pradesh")]
    #[strum(serialize = "Arunachal Pradesh")]
    ArunachalPradesh,
    Assam,
    Bihar,
    Chhattisgarh,
    Goa,
    Gujarat,
    Haryana,
    #[serde(rename = "Himachal Pradesh")]
    #[strum(serialize = "Himachal Pradesh")]
    HimachalPradesh,
    Jharkhand,
    Karnataka,
    Kerala,
    #[serde(rename = "Madhya Pradesh")]
    #[strum(serialize = "Madhya Pradesh")]
    MadhyaPradesh,
    Maharashtra,
    Manipur,
    Meghalaya,
    Mizoram,
    Nagaland,
    Odisha,
    Punjab,
    Rajasthan,
    Sikkim,
    #[serde(rename = "Tamil Nadu")]
    #[strum(serialize = "Tamil Nadu")]
    TamilNadu,
    Telangana,
    Tripura,
    #[serde(rename = "Uttar Pradesh")]
    #[strum(serialize = "Uttar Pradesh")]
    UttarPradesh,
    Uttarakhand,
    #[serde(rename = "West Bengal")]
    #[strum(serialize = "West Bengal")]
    WestBengal,
    Delhi,
    Puducherry,
}

impl State {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::iter().map(Self::name)
    }

    pub fn is_known(name: &str) -> bool {
        name.parse::<Self>().is_ok()
    }
}
