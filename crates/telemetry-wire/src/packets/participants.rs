//! Participants packet (id 4).

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub const MAX_LIVERY_COLOURS: usize = 4;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ParticipantLayout {
    pub name_len: usize,
    pub has_livery: bool,
}

impl ParticipantLayout {
    pub(crate) fn for_format(format: PacketFormat) -> Self {
        match format {
            PacketFormat::F2024 => Self {
                name_len: 48,
                has_livery: false,
            },
            PacketFormat::F2025 => Self {
                name_len: 32,
                has_livery: true,
            },
        }
    }

    pub(crate) fn entry_size(self) -> usize {
        let livery = if self.has_livery {
            1 + MAX_LIVERY_COLOURS * 3
        } else {
            0
        };
        12 + self.name_len + livery
    }

    /// Offset of the name field inside an entry.
    pub(crate) const NAME_OFFSET: usize = 7;
}

pub fn participants_body_size(format: PacketFormat) -> usize {
    1 + NUM_CARS * ParticipantLayout::for_format(format).entry_size()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveryColour {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Livery {
    pub num_colours: u8,
    pub colours: [LiveryColour; MAX_LIVERY_COLOURS],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantData {
    pub ai_controlled: u8,
    pub driver_id: u8,
    pub network_id: u8,
    pub team_id: u8,
    pub my_team: u8,
    pub race_number: u8,
    pub nationality: u8,
    pub name: String,
    pub your_telemetry: u8,
    pub show_online_names: u8,
    pub tech_level: u16,
    pub platform: u8,
    /// 2025 format only.
    pub livery: Option<Livery>,
}

impl ParticipantData {
    fn decode(r: &mut ByteReader<'_>, layout: ParticipantLayout) -> Result<Self, DecodeError> {
        let ai_controlled = r.u8()?;
        let driver_id = r.u8()?;
        let network_id = r.u8()?;
        let team_id = r.u8()?;
        let my_team = r.u8()?;
        let race_number = r.u8()?;
        let nationality = r.u8()?;
        let name = r.fixed_string(layout.name_len)?;
        let your_telemetry = r.u8()?;
        let show_online_names = r.u8()?;
        let tech_level = r.u16_le()?;
        let platform = r.u8()?;
        let livery = if layout.has_livery {
            let num_colours = r.u8()?;
            let mut colours = [LiveryColour::default(); MAX_LIVERY_COLOURS];
            for colour in &mut colours {
                *colour = LiveryColour {
                    red: r.u8()?,
                    green: r.u8()?,
                    blue: r.u8()?,
                };
            }
            Some(Livery {
                num_colours,
                colours,
            })
        } else {
            None
        };

        Ok(Self {
            ai_controlled,
            driver_id,
            network_id,
            team_id,
            my_team,
            race_number,
            nationality,
            name,
            your_telemetry,
            show_online_names,
            tech_level,
            platform,
            livery,
        })
    }

    pub fn is_ai(&self) -> bool {
        self.ai_controlled != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketParticipants {
    pub num_active_cars: u8,
    pub participants: CarArray<ParticipantData>,
}

impl PacketParticipants {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let layout = ParticipantLayout::for_format(PacketFormat::from_raw(format)?);
        let num_active_cars = r.u8()?;
        DecodeError::check_count("numActiveCars", num_active_cars, NUM_CARS)?;
        Ok(Self {
            num_active_cars,
            participants: CarArray::decode_with(r, |r| ParticipantData::decode(r, layout))?,
        })
    }

    /// Participants in the active slots, in slot order.
    pub fn active(&self) -> impl Iterator<Item = &ParticipantData> {
        self.participants
            .iter()
            .take(usize::from(self.num_active_cars))
    }
}
