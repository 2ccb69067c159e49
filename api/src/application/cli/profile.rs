use anyhow::bail;
use nutritot_core::{
    domain::profile::{entities::BabyProfile, ports::ProfileStore},
    infrastructure::profile::FileProfileStore,
};
use tracing::info;

use crate::args::{ProfileAction, ProfileArgs};

fn print_profile(profile: &BabyProfile) {
    println!("Age: {}", profile.age_description());
    println!("Stage: {}", profile.development_stage().as_str());
    if profile.allergies.is_empty() {
        println!("Allergies: none");
    } else {
        println!("Allergies:");
        for (index, allergy) in profile.allergies.iter().enumerate() {
            println!("  [{index}] {allergy}");
        }
    }
}

/// Applies `action` to `profile`; `None` when nothing needs saving.
pub fn apply(
    mut profile: BabyProfile,
    action: ProfileAction,
) -> Result<Option<BabyProfile>, anyhow::Error> {
    match action {
        ProfileAction::Show => return Ok(None),
        ProfileAction::Set { age, allergies } => {
            profile = BabyProfile {
                age_months: age,
                allergies: Vec::new(),
            };
            for allergy in allergies {
                profile.add_allergy(&allergy);
            }
        }
        ProfileAction::AddAllergy { allergy } => {
            if !profile.add_allergy(&allergy) {
                bail!("allergy name is empty");
            }
        }
        ProfileAction::RemoveAllergy { index } => {
            if profile.remove_allergy(index).is_none() {
                bail!(
                    "no allergy at index {index}, the profile lists {}",
                    profile.allergies.len()
                );
            }
        }
    }

    Ok(Some(profile))
}

pub fn run(args: ProfileArgs) -> Result<(), anyhow::Error> {
    let store = FileProfileStore::new(&args.client.profile_dir);
    let profile = store.load()?.unwrap_or_default();

    match apply(profile.clone(), args.action)? {
        Some(updated) => {
            store.save(&updated)?;
            info!(path = %store.path().display(), "Profile saved");
            print_profile(&updated);
        }
        None => print_profile(&profile),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toddler() -> BabyProfile {
        BabyProfile {
            age_months: 18,
            allergies: vec!["wheat".to_string()],
        }
    }

    #[test]
    fn show_changes_nothing() {
        assert!(apply(toddler(), ProfileAction::Show).unwrap().is_none());
    }

    #[test]
    fn set_replaces_age_and_allergies() {
        let updated = apply(
            toddler(),
            ProfileAction::Set {
                age: 30,
                allergies: vec!["egg".to_string(), " ".to_string(), " milk ".to_string()],
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.age_months, 30);
        assert_eq!(updated.allergies, vec!["egg", "milk"]);
    }

    #[test]
    fn blank_allergy_is_rejected() {
        let result = apply(
            toddler(),
            ProfileAction::AddAllergy {
                allergy: "   ".to_string(),
            },
        );

        assert!(result.is_err());
    }

    #[test]
    fn remove_out_of_range_is_rejected() {
        assert!(apply(toddler(), ProfileAction::RemoveAllergy { index: 3 }).is_err());

        let updated = apply(toddler(), ProfileAction::RemoveAllergy { index: 0 })
            .unwrap()
            .unwrap();
        assert!(updated.allergies.is_empty());
    }
}
