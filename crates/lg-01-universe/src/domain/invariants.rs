//! # Universe Invariants
//!
//! Checks that gate genesis and birth.

use super::entities::{BirthContent, User};
use super::errors::UniverseError;
use super::identity::Gender;
use shared_crypto::SchemeRegistry;

/// Parent signatures a birth certificate must carry.
pub const REQUIRED_PARENTS: usize = 2;

/// Genesis pair: parentless, self-consistent ids, usable keys, opposite genders.
pub fn invariant_root_pair(
    a: &User,
    b: &User,
    registry: &SchemeRegistry,
) -> Result<(), UniverseError> {
    let gender_a = root_gender(a, registry)?;
    let gender_b = root_gender(b, registry)?;
    if gender_a == gender_b {
        return Err(UniverseError::InvalidRootPair(format!(
            "both roots are {gender_a}"
        )));
    }
    Ok(())
}

fn root_gender(user: &User, registry: &SchemeRegistry) -> Result<Gender, UniverseError> {
    if !user.is_root() {
        return Err(UniverseError::InvalidRootPair("root has parents".into()));
    }
    if user.compute_id()? != user.id {
        return Err(UniverseError::InvalidRootPair("root id does not match content".into()));
    }
    if !registry.supports(&user.auth.source, &user.auth.sig_type) {
        return Err(UniverseError::InvalidRootPair(format!(
            "unsupported root key scheme {}",
            user.auth.scheme_label()
        )));
    }
    user.gender()
}

/// Both parents signed the profile, are distinct and of opposite genders.
///
/// Returns the parents ordered `[female, male]`.
pub fn invariant_birth_parents<'a>(
    content: &BirthContent,
    parents: [&'a User; 2],
    registry: &SchemeRegistry,
) -> Result<[&'a User; 2], UniverseError> {
    let [first, second] = parents;
    if first.id == second.id {
        return Err(UniverseError::InvalidBirthContent(
            "both signatures come from the same parent".into(),
        ));
    }

    let profile = content.profile_bytes()?;
    for (approval, parent) in content.parents.iter().zip(parents) {
        let valid = registry
            .verify(&profile, &approval.signature, &parent.auth)
            .map_err(|e| UniverseError::InvalidBirthContent(e.to_string()))?;
        if !valid {
            return Err(UniverseError::InvalidBirthContent(format!(
                "parent {} signature does not verify",
                shared_types::short_hex(&parent.id)
            )));
        }
    }

    match (first.gender()?, second.gender()?) {
        (Gender::Female, Gender::Male) => Ok([first, second]),
        (Gender::Male, Gender::Female) => Ok([second, first]),
        (g, _) => Err(UniverseError::InvalidBirthContent(format!(
            "both parents are {g}"
        ))),
    }
}
